//! Engine facade
//!
//! Fronts signal extraction and clustering with the result cache and runs
//! claim review through the provider chain. Only invalid input is ever
//! returned as an error; every dependency failure degrades in place.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use medlens_core::{
    advise, assess_claims, bucket_counts, extraction_key, high_risk_count, patterns_key,
    validate_cluster_count, ClusterResult, InputError, Signal, EXTRACTION_TTL_SECS,
    PATTERNS_TTL_SECS,
};
use medlens_nlp::{
    prepare_texts, ClusterEngine, ModelExtractor, ModelStatus, ProviderChain, ResultCache,
    SignalFusion,
};

use crate::{truncate_summary, MisinformationReport, SymptomReport};

/// Engine configuration
pub struct EngineConfig {
    /// NER extractor (pre-constructed)
    pub model: Arc<ModelExtractor>,
    /// Claim summary providers
    pub chain: ProviderChain,
    /// Result cache
    pub cache: ResultCache,
    /// Clustering strategies
    pub clusters: ClusterEngine,
    /// TTL for cached extraction results
    pub extraction_ttl: Duration,
    /// TTL for cached clustering results
    pub patterns_ttl: Duration,
    /// Signals kept in a symptom report
    pub max_signals: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: Arc::new(ModelExtractor::disabled()),
            chain: ProviderChain::heuristic_only(),
            cache: ResultCache::disabled(),
            clusters: ClusterEngine::new(),
            extraction_ttl: Duration::from_secs(EXTRACTION_TTL_SECS),
            patterns_ttl: Duration::from_secs(PATTERNS_TTL_SECS),
            max_signals: 10,
        }
    }
}

/// The MedLens engine
pub struct Engine {
    fusion: SignalFusion,
    clusters: Arc<ClusterEngine>,
    chain: ProviderChain,
    cache: ResultCache,
    extraction_ttl: Duration,
    patterns_ttl: Duration,
    max_signals: usize,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        info!(
            "Engine ready (cache={}, clustering={})",
            if config.cache.is_enabled() { "enabled" } else { "disabled" },
            config.clusters.primary_name()
        );

        Self {
            fusion: SignalFusion::new(config.model),
            clusters: Arc::new(config.clusters),
            chain: config.chain,
            cache: config.cache,
            extraction_ttl: config.extraction_ttl,
            patterns_ttl: config.patterns_ttl,
            max_signals: config.max_signals,
        }
    }

    /// Initialize the NER model ahead of the first request
    pub async fn warm_up(&self) -> ModelStatus {
        self.fusion.model().initialize().await
    }

    pub async fn model_status(&self) -> ModelStatus {
        self.fusion.model().status().await
    }

    /// Ranked, deduplicated signals for `text`
    ///
    /// Results shaped by a transient model failure are returned but not cached.
    pub async fn extract_signals(&self, text: &str, prefer_model: bool) -> Vec<Signal> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let key = extraction_key(text, prefer_model);
        if let Some(cached) = self.cache.get_json::<Vec<Signal>>(&key).await {
            debug!("Returning cached signals ({})", cached.len());
            return cached;
        }

        let fused = self.fusion.fuse(text, prefer_model).await;
        if fused.degraded {
            debug!("Not caching signals degraded by a model call failure");
        } else {
            self.cache.put_json(&key, &fused.signals, self.extraction_ttl).await;
        }
        fused.signals
    }

    /// Cluster `texts` into `k` groups
    ///
    /// Rejects `k < 2` before touching the cache or any backend. Clustering
    /// runs on the blocking pool.
    pub async fn cluster<S: AsRef<str>>(
        &self,
        texts: &[S],
        k: usize,
    ) -> Result<Vec<ClusterResult>, InputError> {
        validate_cluster_count(k)?;

        let texts = prepare_texts(texts);
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let key = patterns_key(&texts, k);
        if let Some(cached) = self.cache.get_json::<Vec<ClusterResult>>(&key).await {
            info!("Returning cached clustering results (k={})", k);
            return Ok(cached);
        }

        let clusters = Arc::clone(&self.clusters);
        let batch = texts.clone();
        let results = match tokio::task::spawn_blocking(move || clusters.cluster(&batch, k)).await {
            Ok(results) => results?,
            Err(e) => {
                error!("Clustering task failed; using topic buckets: {}", e);
                bucket_counts(&texts)
            }
        };

        self.cache.put_json(&key, &results, self.patterns_ttl).await;
        info!(
            "Computed clustering results (k={}, clusters={}, texts={})",
            k,
            results.len(),
            texts.len()
        );
        Ok(results)
    }

    /// Claim summaries; always exactly one element
    pub async fn summarize_claims(&self, text: &str) -> Vec<String> {
        self.chain.summarize_claims(text).await
    }

    /// Signals with suggested actions and caution flags
    pub async fn symptom_check(&self, text: &str, prefer_model: bool) -> SymptomReport {
        let mut signals = self.extract_signals(text, prefer_model).await;
        signals.truncate(self.max_signals);

        let advice = advise(&signals);
        info!(
            "Symptom check completed (extracted={}, actions={}, cautions={})",
            signals.len(),
            advice.suggested_actions.len(),
            advice.caution_flags.len()
        );

        SymptomReport {
            extracted_symptoms: signals,
            suggested_actions: advice.suggested_actions,
            caution_flags: advice.caution_flags,
        }
    }

    /// Heuristic claim assessments plus a provider summary
    pub async fn misinformation_scan(&self, text: &str) -> MisinformationReport {
        let assessments = assess_claims(text);
        let high_risk = high_risk_count(&assessments);

        let summary = self
            .summarize_claims(text)
            .await
            .into_iter()
            .next()
            .filter(|s| !s.trim().is_empty())
            .map(|s| truncate_summary(&s));

        info!(
            "Misinformation scan completed (claims={}, high_risk={})",
            assessments.len(),
            high_risk
        );

        MisinformationReport {
            assessments,
            summary,
            high_risk_count: high_risk,
        }
    }
}
