//! Deterministic cache keys
//!
//! A fingerprint is `operation:version:param:...`, with free text folded in
//! as a truncated SHA-256 digest so raw input never appears in a key.

use sha2::{Digest, Sha256};

/// Operation name for signal extraction results
pub const SYMPTOM_EXTRACT_OP: &str = "symptom_extract";

/// Operation name for clustering results
pub const PATTERNS_OP: &str = "patterns";

/// Current fingerprint version tag
pub const FINGERPRINT_VERSION: &str = "v1";

/// Builder for cache fingerprints
#[derive(Debug, Clone)]
pub struct Fingerprint {
    parts: Vec<String>,
}

impl Fingerprint {
    pub fn new(operation: &str, version: &str) -> Self {
        Self {
            parts: vec![operation.to_string(), version.to_string()],
        }
    }

    /// Append a literal parameter
    pub fn param(mut self, value: impl ToString) -> Self {
        self.parts.push(value.to_string());
        self
    }

    /// Append a digest of free text
    pub fn text(mut self, text: &str) -> Self {
        self.parts.push(digest(text));
        self
    }

    pub fn build(self) -> String {
        self.parts.join(":")
    }
}

/// Short hex SHA-256 digest of a string
pub fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

/// Fingerprint for `extract_signals(text, prefer_model)`
pub fn extraction_key(text: &str, prefer_model: bool) -> String {
    Fingerprint::new(SYMPTOM_EXTRACT_OP, FINGERPRINT_VERSION)
        .param(u8::from(prefer_model))
        .text(text)
        .build()
}

/// Fingerprint for `cluster(texts, k)` over already-filtered texts
pub fn patterns_key<S: AsRef<str>>(texts: &[S], k: usize) -> String {
    let joined = texts
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    Fingerprint::new(PATTERNS_OP, FINGERPRINT_VERSION)
        .param(k)
        .text(&joined)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_key_is_deterministic() {
        let a = extraction_key("slight fever", true);
        let b = extraction_key("slight fever", true);
        assert_eq!(a, b);
        assert!(a.starts_with("symptom_extract:v1:1:"));
        assert!(!a.contains("slight fever"));
    }

    #[test]
    fn test_extraction_key_varies_with_params() {
        assert_ne!(extraction_key("fever", true), extraction_key("fever", false));
        assert_ne!(extraction_key("fever", true), extraction_key("cough", true));
    }

    #[test]
    fn test_patterns_key_includes_k() {
        let texts = ["fever", "cough"];
        assert_ne!(patterns_key(&texts, 2), patterns_key(&texts, 3));
        assert!(patterns_key(&texts, 3).starts_with("patterns:v1:3:"));
    }
}
