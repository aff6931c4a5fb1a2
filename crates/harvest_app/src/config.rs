//! Run configuration loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use harvest_engine::{HttpSettings, OauthCredentials};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("could not parse config file {path:?}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("config file {path:?} is missing a value for {field}")]
    MissingValue { path: PathBuf, field: &'static str },
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    twitter: TwitterSection,
    storage: StorageSection,
    #[serde(default)]
    http: HttpSection,
}

#[derive(Debug, Deserialize)]
struct TwitterSection {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
    #[serde(default = "default_max_items")]
    max_items: usize,
}

#[derive(Debug, Deserialize)]
struct StorageSection {
    #[serde(default = "default_cache_dir")]
    cache_dir: String,
    #[serde(default = "default_cache_file")]
    cache_file: String,
    artifact_dir: String,
}

#[derive(Debug, Default, Deserialize)]
struct HttpSection {
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Everything the binary needs for one run.
#[derive(Debug)]
pub struct Config {
    pub credentials: OauthCredentials,
    pub max_items: usize,
    pub cache_dir: PathBuf,
    pub cache_file: String,
    pub artifact_dir: PathBuf,
    pub http: HttpSettings,
}

impl Config {
    /// Read and validate the config file. Missing credentials or storage
    /// targets are fatal here, before anything touches the network.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|err| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_file(path, file)
    }

    fn from_file(path: &Path, file: ConfigFile) -> Result<Self, ConfigError> {
        let required = [
            ("twitter.consumer_key", &file.twitter.consumer_key),
            ("twitter.consumer_secret", &file.twitter.consumer_secret),
            ("twitter.access_token", &file.twitter.access_token),
            ("twitter.access_token_secret", &file.twitter.access_token_secret),
            ("storage.artifact_dir", &file.storage.artifact_dir),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingValue {
                    path: path.to_path_buf(),
                    field,
                });
            }
        }

        let mut http = HttpSettings::default();
        if let Some(secs) = file.http.connect_timeout_secs {
            http.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.http.request_timeout_secs {
            http.request_timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            credentials: OauthCredentials {
                consumer_key: file.twitter.consumer_key,
                consumer_secret: file.twitter.consumer_secret,
                access_token: file.twitter.access_token,
                access_token_secret: file.twitter.access_token_secret,
            },
            max_items: file.twitter.max_items,
            cache_dir: expand_tilde(&file.storage.cache_dir),
            cache_file: file.storage.cache_file,
            artifact_dir: expand_tilde(&file.storage.artifact_dir),
            http,
        })
    }
}

fn default_max_items() -> usize {
    50
}

fn default_cache_dir() -> String {
    "cache".to_string()
}

fn default_cache_file() -> String {
    "processed.json".to_string()
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
