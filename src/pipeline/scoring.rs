use serde::Serialize;

use crate::models::{Severity, SeverityCounts};

const CRITICAL_WEIGHT: u64 = 25;
const HIGH_WEIGHT: u64 = 15;
const MEDIUM_WEIGHT: u64 = 7;
const LOW_WEIGHT: u64 = 2;

/// 100 minus weighted severity counts, clamped to [0, 100]. Info findings
/// carry no weight.
pub fn score(counts: &SeverityCounts) -> u8 {
    let penalty = counts.iter().fold(0u64, |acc, (severity, count)| {
        let weight = match severity {
            Severity::Critical => CRITICAL_WEIGHT,
            Severity::High => HIGH_WEIGHT,
            Severity::Medium => MEDIUM_WEIGHT,
            Severity::Low => LOW_WEIGHT,
            Severity::Info => 0,
        };
        acc.saturating_add(weight.saturating_mul(*count as u64))
    });
    100u64.saturating_sub(penalty) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Low,
            50..=79 => Self::Moderate,
            _ => Self::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }
}
