//! Text clustering for trend reporting
//!
//! Two strategies share the [`Clusterer`] interface: TF-IDF + k-means
//! (compiled in with the `vector-space` feature) and the fixed topic
//! buckets. [`ClusterEngine`] tries the primary strategy and falls back to
//! the buckets within the same call whenever it fails, so callers never see
//! which backend answered.

use tracing::error;

use medlens_core::{bucket_counts, validate_cluster_count, ClusterResult, InputError};

use crate::DependencyError;
#[cfg(feature = "vector-space")]
use crate::{kmeans, KMeansConfig, TfidfVectorizer, VectorizerConfig};
#[cfg(feature = "vector-space")]
use medlens_core::TOP_TERMS;

/// A strategy that groups texts
pub trait Clusterer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Group non-blank `texts` into clusters
    fn cluster(&self, texts: &[String], k: usize) -> Result<Vec<ClusterResult>, DependencyError>;
}

/// Topic-bucket heuristic
///
/// Ignores `k` and always answers with the fixed bucket set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketClusterer;

impl Clusterer for BucketClusterer {
    fn name(&self) -> &'static str {
        "topic-buckets"
    }

    fn cluster(&self, texts: &[String], _k: usize) -> Result<Vec<ClusterResult>, DependencyError> {
        Ok(bucket_counts(texts))
    }
}

/// TF-IDF + k-means clustering
#[cfg(feature = "vector-space")]
#[derive(Debug, Clone, Default)]
pub struct VectorSpaceClusterer {
    vectorizer: VectorizerConfig,
    kmeans: KMeansConfig,
}

#[cfg(feature = "vector-space")]
impl VectorSpaceClusterer {
    pub fn new(vectorizer: VectorizerConfig, kmeans: KMeansConfig) -> Self {
        Self { vectorizer, kmeans }
    }
}

#[cfg(feature = "vector-space")]
impl Clusterer for VectorSpaceClusterer {
    fn name(&self) -> &'static str {
        "tfidf-kmeans"
    }

    fn cluster(&self, texts: &[String], k: usize) -> Result<Vec<ClusterResult>, DependencyError> {
        let matrix = TfidfVectorizer::new(self.vectorizer.clone()).fit_transform(texts)?;
        let fit = kmeans(&matrix.rows, k, &self.kmeans)?;
        tracing::debug!(
            "k-means converged in {} iterations (inertia={:.4})",
            fit.iterations, fit.inertia
        );

        let counts = fit.counts();
        let results = fit
            .centroids
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(label, (centroid, count))| {
                let mut order: Vec<usize> = (0..centroid.len()).collect();
                order.sort_by(|&a, &b| centroid[b].total_cmp(&centroid[a]));
                let terms = order
                    .into_iter()
                    .take(TOP_TERMS)
                    .map(|j| matrix.vocabulary[j].clone())
                    .collect();
                ClusterResult::new(label, terms, count)
            })
            .collect();

        Ok(results)
    }
}

/// Drop blank texts; clustering only ever sees the remainder
pub fn prepare_texts<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    texts
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Primary strategy with bucket fallback
pub struct ClusterEngine {
    primary: Option<Box<dyn Clusterer>>,
    fallback: BucketClusterer,
}

impl ClusterEngine {
    /// Engine using whichever primary strategy is compiled in
    pub fn new() -> Self {
        #[cfg(feature = "vector-space")]
        {
            Self::with_primary(VectorSpaceClusterer::default())
        }
        #[cfg(not(feature = "vector-space"))]
        {
            tracing::warn!("Vector-space clustering not compiled in; using topic buckets");
            Self::heuristic_only()
        }
    }

    pub fn with_primary(primary: impl Clusterer + 'static) -> Self {
        Self {
            primary: Some(Box::new(primary)),
            fallback: BucketClusterer,
        }
    }

    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            fallback: BucketClusterer,
        }
    }

    /// Name of the strategy tried first
    pub fn primary_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map_or(self.fallback.name(), |p| p.name())
    }

    /// Cluster `texts` into `k` groups
    ///
    /// Blank texts are removed first; nothing left means an empty result.
    /// Only `k < 2` is an error.
    pub fn cluster<S: AsRef<str>>(&self, texts: &[S], k: usize) -> Result<Vec<ClusterResult>, InputError> {
        validate_cluster_count(k)?;

        let texts = prepare_texts(texts);
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(primary) = &self.primary {
            match primary.cluster(&texts, k) {
                Ok(results) => return Ok(results),
                Err(e) => error!("{} clustering failed; using topic buckets: {}", primary.name(), e),
            }
        }

        Ok(self
            .fallback
            .cluster(&texts, k)
            .unwrap_or_else(|_| bucket_counts(&texts)))
    }
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medlens_core::TOPIC_BUCKETS;

    struct BrokenClusterer;

    impl Clusterer for BrokenClusterer {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn cluster(&self, _texts: &[String], _k: usize) -> Result<Vec<ClusterResult>, DependencyError> {
            Err(DependencyError::unavailable("numeric backend missing"))
        }
    }

    fn count_of(results: &[ClusterResult], bucket: &str) -> usize {
        let label = TOPIC_BUCKETS.iter().position(|b| b.name == bucket).unwrap();
        results.iter().find(|r| r.label == label).unwrap().count
    }

    #[test]
    fn test_rejects_small_k() {
        let engine = ClusterEngine::new();
        assert!(engine.cluster(&["fever"], 1).is_err());
        assert!(engine.cluster::<&str>(&[], 0).is_err());
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        let engine = ClusterEngine::new();
        assert!(engine.cluster::<&str>(&[], 3).unwrap().is_empty());
        assert!(engine.cluster(&["", "   "], 2).unwrap().is_empty());
    }

    #[test]
    fn test_fallback_scenario() {
        let engine = ClusterEngine::with_primary(BrokenClusterer);
        let results = engine
            .cluster(
                &["fever and chills", "cough and sore throat", "nausea and stomach pain"],
                2,
            )
            .unwrap();

        assert_eq!(results.len(), TOPIC_BUCKETS.len());
        assert_eq!(count_of(&results, "fever"), 1);
        assert_eq!(count_of(&results, "respiratory"), 1);
        assert_eq!(count_of(&results, "gastro"), 1);
    }

    #[test]
    fn test_heuristic_only_engine() {
        let engine = ClusterEngine::heuristic_only();
        assert_eq!(engine.primary_name(), "topic-buckets");
        let results = engine.cluster(&["hot and feverish"], 5).unwrap();
        assert_eq!(results.len(), TOPIC_BUCKETS.len());
        assert_eq!(count_of(&results, "fever"), 1);
    }

    #[cfg(feature = "vector-space")]
    mod vector_space {
        use super::*;

        fn reports() -> Vec<&'static str> {
            vec![
                "fever chills temperature",
                "high fever with chills",
                "fever temperature chills at night",
                "cough sore throat",
                "dry cough throat irritation",
                "cough with sore throat",
            ]
        }

        #[test]
        fn test_returns_k_clusters() {
            let engine = ClusterEngine::new();
            assert_eq!(engine.primary_name(), "tfidf-kmeans");

            let texts = reports();
            let results = engine.cluster(&texts, 2).unwrap();

            assert_eq!(results.len(), 2);
            assert_eq!(results.iter().map(|r| r.count).sum::<usize>(), texts.len());
            for (i, result) in results.iter().enumerate() {
                assert_eq!(result.label, i);
                assert!(!result.terms.is_empty());
                assert!(result.terms.len() <= TOP_TERMS);
            }
        }

        #[test]
        fn test_groups_by_topic() {
            let results = ClusterEngine::new().cluster(&reports(), 2).unwrap();
            let has = |term: &str| results.iter().position(|r| r.terms.iter().any(|t| t == term));

            let fever = has("fever").unwrap();
            let cough = has("cough").unwrap();
            assert_ne!(fever, cough);
            assert_eq!(results[fever].count, 3);
            assert_eq!(results[cough].count, 3);
        }

        #[test]
        fn test_blank_texts_are_excluded_from_counts() {
            let mut texts = reports();
            texts.push("   ");
            texts.push("");
            let results = ClusterEngine::new().cluster(&texts, 3).unwrap();
            assert_eq!(results.len(), 3);
            assert_eq!(results.iter().map(|r| r.count).sum::<usize>(), 6);
        }

        #[test]
        fn test_more_clusters_than_texts_falls_back() {
            let results = ClusterEngine::new()
                .cluster(&["fever and chills", "sore throat"], 4)
                .unwrap();
            assert_eq!(results.len(), TOPIC_BUCKETS.len());
        }

        #[test]
        fn test_is_reproducible() {
            let engine = ClusterEngine::new();
            assert_eq!(
                engine.cluster(&reports(), 3).unwrap(),
                engine.cluster(&reports(), 3).unwrap()
            );
        }
    }
}
