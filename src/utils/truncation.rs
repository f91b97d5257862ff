const MAX_ERROR_LENGTH: usize = 2_000;

/// Cut `text` to at most `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn truncate_error(error: &str) -> String {
    let cut = truncate_chars(error, MAX_ERROR_LENGTH);
    if cut.len() == error.len() {
        error.to_string()
    } else {
        format!("{}...", cut)
    }
}

/// Shorten a command line for log fields.
pub fn truncate_command(command: &str) -> &str {
    truncate_chars(command, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input_untouched() {
        assert_eq!(truncate_chars("nmap", 10), "nmap");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 2), "éé");
    }

    #[test]
    fn test_truncate_error_appends_ellipsis() {
        let long = "x".repeat(MAX_ERROR_LENGTH + 10);
        let out = truncate_error(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.len(), MAX_ERROR_LENGTH + 3);
    }
}
