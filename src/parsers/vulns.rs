use serde_json::Value;

use crate::models::{Capability, Finding, Severity};
use crate::utils::truncation::truncate_chars;
use super::strip_ansi;

const FALLBACK_IDENTIFIER: &str = "nuclei-finding";
const FALLBACK_DESCRIPTION_CHARS: usize = 150;

/// Parse nuclei output into vulnerability findings for `host`.
///
/// JSONL records are read field by field, tolerating both the current and
/// the older hyphenated key names. Plain-text result lines (anything
/// carrying a `[...]` tag) become a generic finding whose severity comes
/// from the tag, defaulting to low.
pub fn parse_vulnerabilities(output: &str, host: &str) -> Vec<Finding> {
    let text = strip_ansi(output);
    let mut findings = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("[WRN]") || line.starts_with("[INF]") {
            continue;
        }

        let finding = match serde_json::from_str::<Value>(line) {
            Ok(record @ Value::Object(_)) => Some(from_json(&record, host)),
            _ => from_text(line, host),
        };
        if let Some(finding) = finding {
            findings.push(finding);
        }
    }

    findings
}

fn str_field<'a>(record: &'a Value, pointers: &[&str]) -> Option<&'a str> {
    pointers
        .iter()
        .filter_map(|p| record.pointer(p).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn from_json(record: &Value, host: &str) -> Finding {
    let severity = str_field(record, &["/info/severity", "/severity"])
        .map(Severity::from_tool)
        .unwrap_or(Severity::Info);

    Finding {
        capability: Capability::Vuln,
        severity,
        identifier: str_field(record, &["/templateID", "/template-id"])
            .unwrap_or("unknown")
            .to_string(),
        description: str_field(record, &["/info/name", "/name"])
            .unwrap_or("Unknown Finding")
            .to_string(),
        source_host: host.to_string(),
        url: str_field(record, &["/matched", "/matched-at"]).map(str::to_string),
    }
}

fn from_text(line: &str, host: &str) -> Option<Finding> {
    if !(line.contains('[') && line.contains(']')) {
        return None;
    }
    let severity = if line.contains("[critical]") {
        Severity::Critical
    } else if line.contains("[high]") {
        Severity::High
    } else if line.contains("[medium]") {
        Severity::Medium
    } else if line.contains("[info]") {
        Severity::Info
    } else {
        Severity::Low
    };

    Some(Finding {
        capability: Capability::Vuln,
        severity,
        identifier: FALLBACK_IDENTIFIER.to_string(),
        description: truncate_chars(line, FALLBACK_DESCRIPTION_CHARS).to_string(),
        source_host: host.to_string(),
        url: None,
    })
}
