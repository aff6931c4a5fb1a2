const MAX_STEM_LEN: usize = 120;

/// Windows-safe artifact filename: `{sanitized title}.pdf`
pub fn artifact_filename(title: &str) -> String {
    format!("{}.pdf", sanitize_title(title))
}

fn sanitize_title(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut final_name = compacted;
    if final_name.len() > MAX_STEM_LEN {
        let mut cut = MAX_STEM_LEN;
        while !final_name.is_char_boundary(cut) {
            cut -= 1;
        }
        final_name.truncate(cut);
    }
    if is_reserved_windows_name(&final_name) {
        final_name.push('_');
    }
    final_name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_titles_pass_through() {
        assert_eq!(artifact_filename("A Study of Widgets"), "A Study of Widgets.pdf");
    }

    #[test]
    fn forbidden_characters_collapse_to_single_underscores() {
        assert_eq!(artifact_filename("a/b: c?"), "a_b_ c.pdf");
        assert_eq!(artifact_filename("...   "), "untitled.pdf");
    }

    #[test]
    fn reserved_device_names_are_padded() {
        assert_eq!(artifact_filename("CON"), "CON_.pdf");
        assert_eq!(artifact_filename("con"), "con_.pdf");
    }

    #[test]
    fn long_titles_are_cut_at_a_char_boundary() {
        let long = "é".repeat(200);
        let name = artifact_filename(&long);
        assert!(name.len() <= MAX_STEM_LEN + ".pdf".len());
        assert!(name.ends_with(".pdf"));
    }
}
