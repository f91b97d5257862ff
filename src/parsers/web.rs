use super::strip_ansi;

pub const MAX_WEB_FINDINGS: usize = 25;

/// Keep nikto's report lines: `+`-prefixed items, OSVDB references and the
/// server banner. Capped at `MAX_WEB_FINDINGS`.
pub fn parse_web_findings(output: &str) -> Vec<String> {
    strip_ansi(output)
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('+') || line.contains("OSVDB") || line.contains("Server:"))
        .take(MAX_WEB_FINDINGS)
        .map(str::to_string)
        .collect()
}
