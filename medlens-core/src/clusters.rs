//! Cluster results and the fixed topic buckets
//!
//! Buckets are the fallback grouping used when vector-space clustering is
//! not available. A text counts toward every bucket whose keyword list it
//! touches, so bucket counts are independent and do not form a partition.

use serde::{Deserialize, Serialize};

use crate::TOP_TERMS;

/// One group of texts with its most representative terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterResult {
    /// Cluster id, 0-based
    pub label: usize,
    /// Ranked terms, most representative first
    pub terms: Vec<String>,
    /// Number of texts counted toward this cluster
    pub count: usize,
}

impl ClusterResult {
    pub fn new(label: usize, terms: Vec<String>, count: usize) -> Self {
        let mut terms = terms;
        terms.truncate(TOP_TERMS);
        Self {
            label,
            terms,
            count,
        }
    }
}

/// A keyword-defined topic bucket
#[derive(Debug, Clone, Copy)]
pub struct TopicBucket {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

impl TopicBucket {
    /// Whether any bucket keyword occurs in the text (case-insensitive)
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k))
    }
}

/// Fixed fallback buckets; their order defines the cluster labels
pub const TOPIC_BUCKETS: &[TopicBucket] = &[
    TopicBucket {
        name: "fever",
        keywords: &["fever", "temperature", "hot", "chills"],
    },
    TopicBucket {
        name: "respiratory",
        keywords: &["cough", "throat", "breath", "chest", "nose"],
    },
    TopicBucket {
        name: "gastro",
        keywords: &["nausea", "vomit", "diarrhea", "stomach", "pain"],
    },
];

/// Count texts per topic bucket
///
/// Always returns one result per bucket, in bucket order.
pub fn bucket_counts<S: AsRef<str>>(texts: &[S]) -> Vec<ClusterResult> {
    TOPIC_BUCKETS
        .iter()
        .enumerate()
        .map(|(label, bucket)| {
            let count = texts.iter().filter(|t| bucket.matches(t.as_ref())).count();
            let terms = bucket.keywords.iter().map(|k| k.to_string()).collect();
            ClusterResult::new(label, terms, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_counts_one_per_topic() {
        let texts = ["fever and chills", "cough and sore throat", "nausea and stomach pain"];
        let results = bucket_counts(&texts);

        assert_eq!(results.len(), TOPIC_BUCKETS.len());
        for (result, bucket) in results.iter().zip(TOPIC_BUCKETS) {
            assert_eq!(result.count, 1, "bucket {}", bucket.name);
            assert_eq!(result.terms[0], bucket.keywords[0]);
        }
    }

    #[test]
    fn test_buckets_overlap() {
        // "chest pain" hits respiratory (chest) and gastro (pain)
        let results = bucket_counts(&["sharp chest pain"]);
        assert_eq!(results[0].count, 0);
        assert_eq!(results[1].count, 1);
        assert_eq!(results[2].count, 1);
    }

    #[test]
    fn test_terms_are_truncated() {
        let terms = (0..12).map(|i| format!("t{i}")).collect();
        let result = ClusterResult::new(0, terms, 3);
        assert_eq!(result.terms.len(), TOP_TERMS);
    }
}
