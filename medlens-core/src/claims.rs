//! Heuristic screening of health claims
//!
//! Flags sentences carrying absolute or sensational phrasing that tends to
//! accompany medical misinformation, and points readers at trusted sources.

use serde::{Deserialize, Serialize};

/// A public health authority used as a reference
#[derive(Debug, Clone, Copy)]
pub struct TrustedSource {
    pub name: &'static str,
    pub url: &'static str,
}

/// Authorities cited by every assessment
pub const TRUSTED_SOURCES: &[TrustedSource] = &[
    TrustedSource {
        name: "MoHFW",
        url: "https://www.mohfw.gov.in",
    },
    TrustedSource {
        name: "ICMR",
        url: "https://www.icmr.gov.in",
    },
    TrustedSource {
        name: "NHP",
        url: "https://www.nhp.gov.in",
    },
    TrustedSource {
        name: "WHO India",
        url: "https://www.who.int/india",
    },
];

/// Phrases that mark a sentence as high risk
pub const RISKY_PHRASES: &[&str] = &[
    "miracle cure",
    "100% effective",
    "no side effects",
    "detox",
    "instantly",
    "secret remedy",
];

const HIGH_RISK_RATIONALE: &str =
    "Contains absolute or sensational claims often associated with misinformation.";

const LOW_RISK_CLAIM: &str = "General content review";

const LOW_RISK_RATIONALE: &str =
    "No obvious red flags detected with heuristics. Verify health claims with trusted sources.";

/// Which link of the provider chain produced a claim summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Primary,
    Secondary,
    Heuristic,
}

/// A claim summary and its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub text: String,
    pub provider: ProviderKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    High,
}

/// Assessment of a single claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAssessment {
    pub claim: String,
    pub risk: RiskLevel,
    pub rationale: String,
    pub references: Vec<String>,
}

impl ClaimAssessment {
    fn new(claim: &str, risk: RiskLevel, rationale: &str) -> Self {
        Self {
            claim: claim.to_string(),
            risk,
            rationale: rationale.to_string(),
            references: TRUSTED_SOURCES.iter().map(|s| s.url.to_string()).collect(),
        }
    }
}

/// Split text into trimmed, non-empty sentences on `.`
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Assess every sentence of a text
///
/// Never returns an empty list: with nothing flagged, a single low-risk
/// general review is produced.
pub fn assess_claims(text: &str) -> Vec<ClaimAssessment> {
    let mut flagged: Vec<ClaimAssessment> = split_sentences(text)
        .into_iter()
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            RISKY_PHRASES.iter().any(|p| lower.contains(p))
        })
        .map(|sentence| ClaimAssessment::new(sentence, RiskLevel::High, HIGH_RISK_RATIONALE))
        .collect();

    if flagged.is_empty() {
        flagged.push(ClaimAssessment::new(
            LOW_RISK_CLAIM,
            RiskLevel::Low,
            LOW_RISK_RATIONALE,
        ));
    }

    flagged
}

/// Count high-risk assessments
pub fn high_risk_count(assessments: &[ClaimAssessment]) -> usize {
    assessments
        .iter()
        .filter(|a| a.risk == RiskLevel::High)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("First one. Second one.. . Third");
        assert_eq!(sentences, vec!["First one", "Second one", "Third"]);
    }

    #[test]
    fn test_flags_sensational_sentences() {
        let text = "Drink water daily. This Miracle Cure heals everything. It has no side effects";
        let assessments = assess_claims(text);

        assert_eq!(assessments.len(), 2);
        assert_eq!(high_risk_count(&assessments), 2);
        assert_eq!(assessments[0].claim, "This Miracle Cure heals everything");
        assert_eq!(assessments[0].references.len(), TRUSTED_SOURCES.len());
    }

    #[test]
    fn test_clean_text_gets_general_review() {
        let assessments = assess_claims("Wash your hands. Sleep well.");
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].risk, RiskLevel::Low);
        assert_eq!(assessments[0].claim, LOW_RISK_CLAIM);
        assert_eq!(high_risk_count(&assessments), 0);
    }
}
