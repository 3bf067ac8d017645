//! Composite reports returned to callers

use serde::{Deserialize, Serialize};

use medlens_core::{ClaimAssessment, Signal};

/// Longest claim summary kept in a misinformation report, in characters
pub const MAX_SUMMARY_CHARS: usize = 1000;

/// Extracted symptoms with advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomReport {
    pub extracted_symptoms: Vec<Signal>,
    pub suggested_actions: Vec<String>,
    pub caution_flags: Vec<String>,
}

/// Claim assessments with an optional provider summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisinformationReport {
    pub assessments: Vec<ClaimAssessment>,
    pub summary: Option<String>,
    pub high_risk_count: usize,
}

/// Truncate to at most [`MAX_SUMMARY_CHARS`] characters
pub fn truncate_summary(text: &str) -> String {
    text.chars().take(MAX_SUMMARY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_summary_counts_chars() {
        let long = "é".repeat(MAX_SUMMARY_CHARS + 5);
        assert_eq!(truncate_summary(&long).chars().count(), MAX_SUMMARY_CHARS);
        assert_eq!(truncate_summary("short"), "short");
    }
}
