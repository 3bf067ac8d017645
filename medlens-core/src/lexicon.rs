//! Keyword lexicon for heuristic symptom matching
//!
//! Matching is a case-insensitive substring test, not tokenized, so a
//! keyword may fire inside an unrelated word. That imprecision is accepted
//! for the path that runs when no model is available.

use std::collections::HashSet;

use crate::Signal;

/// A lexicon keyword and the confidence it contributes on a match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconEntry {
    pub keyword: &'static str,
    pub confidence: f64,
}

const fn entry(keyword: &'static str, confidence: f64) -> LexiconEntry {
    LexiconEntry {
        keyword,
        confidence,
    }
}

/// Fixed symptom lexicon, in match order
pub const SYMPTOM_LEXICON: &[LexiconEntry] = &[
    entry("fever", 0.6),
    entry("cough", 0.6),
    entry("headache", 0.55),
    entry("chest pain", 0.7),
    entry("sore throat", 0.55),
    entry("shortness of breath", 0.7),
    entry("fatigue", 0.5),
    entry("nausea", 0.5),
    entry("vomiting", 0.5),
    entry("diarrhea", 0.5),
];

/// Match text against the symptom lexicon
///
/// Returns one signal per matched keyword, in lexicon order. Empty input
/// (or input with no matches) yields an empty vector.
pub fn match_symptoms(text: &str) -> Vec<Signal> {
    match_lexicon(SYMPTOM_LEXICON, text)
}

/// Match text against an arbitrary lexicon
pub fn match_lexicon(lexicon: &[LexiconEntry], text: &str) -> Vec<Signal> {
    let lower = text.to_lowercase();
    let mut seen: HashSet<&str> = HashSet::new();

    lexicon
        .iter()
        .filter(|e| lower.contains(e.keyword) && seen.insert(e.keyword))
        .map(|e| Signal::new(e.keyword, e.confidence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confidence_of(signals: &[Signal], name: &str) -> Option<f64> {
        signals.iter().find(|s| s.name == name).map(|s| s.confidence)
    }

    #[test]
    fn test_match_headache_and_fever() {
        let signals = match_symptoms("I have a bad headache and a slight fever");
        assert_eq!(signals.len(), 2);
        assert_eq!(confidence_of(&signals, "headache"), Some(0.55));
        assert_eq!(confidence_of(&signals, "fever"), Some(0.6));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let signals = match_symptoms("SHORTNESS OF BREATH since Monday");
        assert_eq!(confidence_of(&signals, "shortness of breath"), Some(0.7));
    }

    #[test]
    fn test_match_inside_words() {
        // Substring matching is intentionally crude
        let signals = match_symptoms("feverish all night");
        assert_eq!(confidence_of(&signals, "fever"), Some(0.6));
    }

    #[test]
    fn test_empty_input() {
        assert!(match_symptoms("").is_empty());
        assert!(match_symptoms("feeling great today").is_empty());
    }
}
