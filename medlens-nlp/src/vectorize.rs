//! TF-IDF vectorization over word n-grams
//!
//! Tokens are lowercase runs of two or more word characters. The vocabulary
//! keeps the `max_features` most frequent n-grams across the corpus and is
//! stored in lexical order. Weights use smoothed IDF,
//! `ln((1 + n) / (1 + df)) + 1`, and every row is L2-normalized.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::DependencyError;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Vectorizer settings
#[derive(Debug, Clone)]
pub struct VectorizerConfig {
    /// Vocabulary size cap
    pub max_features: usize,
    /// Inclusive n-gram bounds
    pub ngram_range: (usize, usize),
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_range: (1, 2),
        }
    }
}

/// Dense TF-IDF matrix, one row per document
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub vocabulary: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Lowercase word tokens of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_REGEX
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// All n-grams of `tokens` with `min <= n <= max`, space-joined
pub fn ngrams(tokens: &[String], (min, max): (usize, usize)) -> Vec<String> {
    let mut grams = Vec::new();
    for n in min.max(1)..=max {
        for window in tokens.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

/// Fits a vocabulary and produces TF-IDF rows
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
}

impl TfidfVectorizer {
    pub fn new(config: VectorizerConfig) -> Self {
        Self { config }
    }

    pub fn fit_transform<S: AsRef<str>>(&self, texts: &[S]) -> Result<TfidfMatrix, DependencyError> {
        let doc_counts: Vec<HashMap<String, usize>> = texts
            .iter()
            .map(|text| {
                let mut counts = HashMap::new();
                for gram in ngrams(&tokenize(text.as_ref()), self.config.ngram_range) {
                    *counts.entry(gram).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in &doc_counts {
            for (term, count) in counts {
                *corpus_freq.entry(term.as_str()).or_insert(0) += count;
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if corpus_freq.is_empty() {
            return Err(DependencyError::call_failed(
                "empty vocabulary; documents contain no usable tokens",
            ));
        }

        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.config.max_features);

        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let n = texts.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|t| {
                let df = doc_freq.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = doc_counts
            .iter()
            .map(|counts| {
                let mut row = vec![0.0; vocabulary.len()];
                for (term, count) in counts {
                    if let Some(&j) = index.get(term.as_str()) {
                        row[j] = *count as f64 * idf[j];
                    }
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(TfidfMatrix { vocabulary, rows })
    }
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in row.iter_mut() {
            *v /= norm;
        }
    }
}
