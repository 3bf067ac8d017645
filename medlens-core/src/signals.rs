//! Symptom signals extracted from free text
//!
//! A signal is a named concept (usually a symptom) with a confidence score.
//! Names are the identity: they are trimmed and lowercased before use, and
//! within one extraction result each name appears once.

use serde::{Deserialize, Serialize};

use crate::{MAX_CONFIDENCE, MIN_CONFIDENCE};

/// Label fragments that mark a model span as clinically relevant
const CLINICAL_LABELS: &[&str] = &["SYMPT", "DISE", "PROBLEM", "CONDITION"];

/// A named extracted concept with a confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Normalized (trimmed, lowercase) name
    pub name: String,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
}

impl Signal {
    /// Create a signal, normalizing the name and clamping the confidence
    pub fn new(name: &str, confidence: f64) -> Self {
        Self {
            name: normalize_name(name),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Normalize a signal name into its dedup key
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Clamp a score into the confidence range; NaN maps to zero
pub fn clamp_confidence(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_CONFIDENCE;
    }
    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// A labeled span produced by the NER model, before fusion
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpan {
    pub label: String,
    pub text: String,
    pub score: f64,
}

impl RawSpan {
    pub fn new(label: &str, text: &str, score: f64) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
            score,
        }
    }

    /// Whether the span's label belongs to the symptom/disease/problem/condition family
    pub fn is_clinical(&self) -> bool {
        let label = self.label.to_uppercase();
        CLINICAL_LABELS.iter().any(|key| label.contains(key))
    }

    /// Convert an accepted span into a signal; spans with blank text yield nothing
    pub fn to_signal(&self) -> Option<Signal> {
        if self.text.trim().is_empty() {
            return None;
        }
        Some(Signal::new(&self.text, self.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_normalizes_name() {
        let signal = Signal::new("  Chest Pain ", 0.7);
        assert_eq!(signal.name, "chest pain");
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Signal::new("fever", 1.7).confidence, 1.0);
        assert_eq!(Signal::new("fever", -0.2).confidence, 0.0);
        assert_eq!(Signal::new("fever", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_clinical_labels() {
        assert!(RawSpan::new("Sign_symptom", "cough", 0.9).is_clinical());
        assert!(RawSpan::new("Disease_disorder", "flu", 0.9).is_clinical());
        assert!(RawSpan::new("B-PROBLEM", "pain", 0.9).is_clinical());
        assert!(!RawSpan::new("Medication", "paracetamol", 0.9).is_clinical());
        assert!(!RawSpan::new("Age", "42", 0.9).is_clinical());
    }

    #[test]
    fn test_blank_span_yields_no_signal() {
        assert!(RawSpan::new("Sign_symptom", "   ", 0.9).to_signal().is_none());
        let signal = RawSpan::new("Sign_symptom", " Fever", 0.81).to_signal().unwrap();
        assert_eq!(signal.name, "fever");
    }
}
