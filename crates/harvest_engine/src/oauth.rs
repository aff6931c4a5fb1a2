use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Unreserved characters stay literal, everything else is percent-encoded
/// (RFC 5849 section 3.6).
const PARAMETER_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// User-context OAuth 1.0a credentials for the feed API.
#[derive(Clone)]
pub struct OauthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for OauthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OauthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl OauthCredentials {
    /// `Authorization` header value for a signed GET of `url` with `query`
    /// parameters.
    ///
    /// `url` must not carry a query string of its own; the caller passes
    /// query parameters separately so they can be signed.
    pub fn authorization_header(&self, url: &str, query: &[(String, String)]) -> String {
        self.signed_header(url, query, "GET", &nonce(), unix_timestamp())
    }

    fn signed_header(
        &self,
        url: &str,
        query: &[(String, String)],
        method: &str,
        nonce: &str,
        timestamp: u64,
    ) -> String {
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer_key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
            ("oauth_token".into(), self.access_token.clone()),
            ("oauth_version".into(), "1.0".into()),
        ];

        let signature = self.signature(method, url, query, &oauth_params);
        oauth_params.push(("oauth_signature".into(), signature));

        let fields = oauth_params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }

    /// Base64 HMAC-SHA1 over the RFC 5849 signature base string.
    fn signature(
        &self,
        method: &str,
        url: &str,
        query: &[(String, String)],
        oauth_params: &[(String, String)],
    ) -> String {
        let mut pairs: Vec<(String, String)> = query
            .iter()
            .chain(oauth_params.iter())
            .map(|(key, value)| (encode(key), encode(value)))
            .collect();
        pairs.sort();

        let normalized = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let base = format!("{}&{}&{}", method, encode(url), encode(&normalized));
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.access_token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("hmac accepts any key size");
        mac.update(base.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, PARAMETER_ENCODE_SET).to_string()
}

fn nonce() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    let mut hex = String::with_capacity(32);
    for byte in bytes {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_credentials() -> OauthCredentials {
        OauthCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn signature_matches_published_worked_example() {
        let credentials = doc_credentials();
        let query = pairs(&[
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
        ]);
        let oauth_params = pairs(&[
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ]);

        let signature = credentials.signature(
            "POST",
            "https://api.twitter.com/1/statuses/update.json",
            &query,
            &oauth_params,
        );

        assert_eq!(signature, "tnnArxj06cWHq44gCs1OSKk/jLY=");
    }

    #[test]
    fn header_carries_all_oauth_fields() {
        let credentials = doc_credentials();
        let header = credentials.signed_header(
            "https://api.twitter.com/1.1/favorites/list.json",
            &pairs(&[("count", "200")]),
            "GET",
            "deadbeef",
            1318622958,
        );

        assert!(header.starts_with("OAuth "));
        for field in [
            "oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\"",
            "oauth_nonce=\"deadbeef\"",
            "oauth_signature_method=\"HMAC-SHA1\"",
            "oauth_timestamp=\"1318622958\"",
            "oauth_version=\"1.0\"",
            "oauth_signature=\"",
        ] {
            assert!(header.contains(field), "missing {field} in {header}");
        }
    }

    #[test]
    fn encoding_keeps_unreserved_and_escapes_the_rest() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(encode("safe-chars_~."), "safe-chars_~.");
    }

    #[test]
    fn nonce_is_fresh_and_hex() {
        let first = nonce();
        let second = nonce();
        assert_ne!(first, second);
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
