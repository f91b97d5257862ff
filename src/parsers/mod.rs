//! Pure, total parsers from raw tool text to typed records.
//!
//! None of these can fail: unrecognised lines are skipped and garbage input
//! yields an empty collection (or, for enumeration, the bare domain).

pub mod ports;
pub mod subdomains;
pub mod vulns;
pub mod web;

use std::sync::LazyLock;

use regex::Regex;

pub use ports::parse_ports;
pub use subdomains::parse_subdomains;
pub use vulns::parse_vulnerabilities;
pub use web::parse_web_findings;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid ANSI escape pattern")
});

/// Remove terminal colour and cursor escapes.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_colours() {
        let raw = "\x1b[31m[critical]\x1b[0m log4j \x1b[1;92mfound\x1b[0m";
        assert_eq!(strip_ansi(raw), "[critical] log4j found");
    }

    #[test]
    fn test_strip_ansi_plain_text_untouched() {
        assert_eq!(strip_ansi("80/tcp open http"), "80/tcp open http");
    }
}
