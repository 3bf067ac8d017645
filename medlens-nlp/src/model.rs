//! Model-backed span extraction
//!
//! The extractor owns a three-state machine:
//! `Uninitialized → Ready` or `Uninitialized → Unavailable` (terminal).
//! The transition out of `Uninitialized` happens under an async mutex, so
//! concurrent first use runs exactly one load and every other caller waits
//! for its outcome. A `Ready` extractor stays `Ready` when single calls fail.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use medlens_core::RawSpan;

use crate::DependencyError;

/// Default token-classification model
pub const DEFAULT_NER_MODEL: &str = "d4data/biomedical-ner-all";

/// Default Hugging Face inference endpoint
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

const WARMUP_TEXT: &str = "Patient reports fever and cough.";

/// A loaded NER model
#[async_trait]
pub trait NerBackend: Send + Sync {
    /// Run token classification over `text`
    async fn predict(&self, text: &str) -> Result<Vec<RawSpan>, DependencyError>;

    /// Model identifier
    fn model_id(&self) -> &str;
}

/// Thread-safe reference to a loaded NER model
pub type SharedNer = Arc<dyn NerBackend>;

/// Performs the one-time model initialization
#[async_trait]
pub trait NerLoader: Send + Sync {
    async fn load(&self) -> Result<SharedNer, DependencyError>;

    fn model_id(&self) -> &str;
}

/// Hugging Face inference configuration
#[derive(Debug, Clone)]
pub struct NerConfig {
    /// Model identifier
    pub model: String,
    /// Bearer token, if the endpoint requires one
    pub api_token: Option<String>,
    /// Inference API base URL
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_NER_MODEL.to_string(),
            api_token: None,
            base_url: DEFAULT_INFERENCE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl NerConfig {
    pub fn new(model: &str, api_token: Option<String>) -> Self {
        Self {
            model: model.to_string(),
            api_token,
            ..Default::default()
        }
    }
}

/// One element of a token-classification response
#[derive(Debug, Deserialize)]
struct HfEntity {
    #[serde(default)]
    entity_group: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

impl From<HfEntity> for RawSpan {
    fn from(e: HfEntity) -> Self {
        RawSpan {
            label: e.entity_group.or(e.entity).unwrap_or_default(),
            text: e.word.unwrap_or_default(),
            score: e.score.unwrap_or(0.0),
        }
    }
}

/// Parse a token-classification response body
fn parse_entities(body: serde_json::Value) -> Result<Vec<RawSpan>, DependencyError> {
    if let Some(message) = body.get("error").and_then(|e| e.as_str()) {
        return Err(DependencyError::call_failed(message));
    }

    let entities: Vec<HfEntity> = serde_json::from_value(body)
        .map_err(|e| DependencyError::call_failed(format!("unexpected NER response: {e}")))?;

    Ok(entities.into_iter().map(RawSpan::from).collect())
}

/// NER model served by the Hugging Face inference API
pub struct HuggingFaceNer {
    client: reqwest::Client,
    config: NerConfig,
}

impl HuggingFaceNer {
    pub fn new(config: NerConfig) -> Result<Self, DependencyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DependencyError::unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl NerBackend for HuggingFaceNer {
    async fn predict(&self, text: &str) -> Result<Vec<RawSpan>, DependencyError> {
        let request_body = serde_json::json!({
            "inputs": text,
            "parameters": { "aggregation_strategy": "simple" },
        });

        let mut request = self
            .client
            .post(format!("{}/models/{}", self.config.base_url, self.config.model))
            .json(&request_body);

        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DependencyError::call_failed(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DependencyError::call_failed(format!("status {status}: {e}")))?;

        parse_entities(body)
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

/// Loads a [`HuggingFaceNer`] and proves it answers with one warm-up call
pub struct HuggingFaceLoader {
    config: NerConfig,
}

impl HuggingFaceLoader {
    pub fn new(config: NerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NerLoader for HuggingFaceLoader {
    async fn load(&self) -> Result<SharedNer, DependencyError> {
        let ner = HuggingFaceNer::new(self.config.clone())?;

        ner.predict(WARMUP_TEXT)
            .await
            .map_err(|e| DependencyError::unavailable(format!("warm-up failed: {e}")))?;

        Ok(Arc::new(ner))
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

/// Externally visible extractor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Uninitialized,
    Ready,
    Unavailable,
}

enum ModelState {
    Uninitialized,
    Ready(SharedNer),
    Unavailable(String),
}

impl ModelState {
    fn status(&self) -> ModelStatus {
        match self {
            ModelState::Uninitialized => ModelStatus::Uninitialized,
            ModelState::Ready(_) => ModelStatus::Ready,
            ModelState::Unavailable(_) => ModelStatus::Unavailable,
        }
    }
}

/// Lazily initialized NER extractor
pub struct ModelExtractor {
    loader: Option<Box<dyn NerLoader>>,
    state: Mutex<ModelState>,
}

impl ModelExtractor {
    /// Create an extractor that loads its model on first use
    pub fn new(loader: impl NerLoader + 'static) -> Self {
        Self {
            loader: Some(Box::new(loader)),
            state: Mutex::new(ModelState::Uninitialized),
        }
    }

    /// Create an extractor that never loads a model
    pub fn disabled() -> Self {
        Self {
            loader: None,
            state: Mutex::new(ModelState::Unavailable("model disabled".to_string())),
        }
    }

    pub async fn status(&self) -> ModelStatus {
        self.state.lock().await.status()
    }

    /// Resolve the state out of `Uninitialized`; idempotent
    pub async fn initialize(&self) -> ModelStatus {
        let mut state = self.state.lock().await;

        if let ModelState::Uninitialized = *state {
            *state = match &self.loader {
                Some(loader) => match loader.load().await {
                    Ok(backend) => {
                        info!("NER model initialized: {}", loader.model_id());
                        ModelState::Ready(backend)
                    }
                    Err(e) => {
                        warn!(
                            "NER model {} unavailable; falling back to heuristics: {}",
                            loader.model_id(),
                            e
                        );
                        ModelState::Unavailable(e.to_string())
                    }
                },
                None => ModelState::Unavailable("no model loader".to_string()),
            };
        }

        state.status()
    }

    async fn ready_backend(&self) -> Result<SharedNer, DependencyError> {
        self.initialize().await;

        match &*self.state.lock().await {
            ModelState::Ready(backend) => Ok(Arc::clone(backend)),
            ModelState::Unavailable(reason) => Err(DependencyError::unavailable(reason.clone())),
            ModelState::Uninitialized => Err(DependencyError::unavailable("model not initialized")),
        }
    }

    /// Run the model over `text`, initializing it on first use
    ///
    /// The lock is released before the model call, so extractions run in
    /// parallel once the model is ready.
    pub async fn extract(&self, text: &str) -> Result<Vec<RawSpan>, DependencyError> {
        let backend = self.ready_backend().await?;

        match backend.predict(text).await {
            Ok(spans) => {
                debug!("NER returned {} spans (text_length={})", spans.len(), text.len());
                Ok(spans)
            }
            Err(e) => {
                error!("NER extraction failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// NER backend returning fixed spans, or failing every call
    pub(crate) struct MockNer {
        pub spans: Vec<RawSpan>,
        pub fail: bool,
    }

    #[async_trait]
    impl NerBackend for MockNer {
        async fn predict(&self, _text: &str) -> Result<Vec<RawSpan>, DependencyError> {
            if self.fail {
                return Err(DependencyError::call_failed("mock failure"));
            }
            Ok(self.spans.clone())
        }

        fn model_id(&self) -> &str {
            "mock-ner"
        }
    }

    /// Loader that counts attempts and can be told to fail
    pub(crate) struct MockLoader {
        pub loads: Arc<AtomicUsize>,
        pub fail: bool,
        pub spans: Vec<RawSpan>,
        pub fail_calls: bool,
    }

    impl MockLoader {
        pub fn ready(spans: Vec<RawSpan>) -> Self {
            Self {
                loads: Arc::new(AtomicUsize::new(0)),
                fail: false,
                spans,
                fail_calls: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ready(Vec::new())
            }
        }
    }

    #[async_trait]
    impl NerLoader for MockLoader {
        async fn load(&self) -> Result<SharedNer, DependencyError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(DependencyError::unavailable("mock load failure"));
            }
            Ok(Arc::new(MockNer {
                spans: self.spans.clone(),
                fail: self.fail_calls,
            }))
        }

        fn model_id(&self) -> &str {
            "mock-ner"
        }
    }

    #[tokio::test]
    async fn test_concurrent_initialize_loads_once() {
        let loader = MockLoader::ready(Vec::new());
        let loads = Arc::clone(&loader.loads);
        let extractor = Arc::new(ModelExtractor::new(loader));

        let attempts = (0..8).map(|_| {
            let extractor = Arc::clone(&extractor);
            async move { extractor.initialize().await }
        });
        let statuses = futures::future::join_all(attempts).await;

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(statuses.iter().all(|s| *s == ModelStatus::Ready));
    }

    #[tokio::test]
    async fn test_failed_load_is_terminal() {
        let loader = MockLoader::failing();
        let loads = Arc::clone(&loader.loads);
        let extractor = ModelExtractor::new(loader);

        assert_eq!(extractor.status().await, ModelStatus::Uninitialized);
        assert_eq!(extractor.initialize().await, ModelStatus::Unavailable);
        assert!(matches!(
            extractor.extract("fever").await,
            Err(DependencyError::Unavailable(_))
        ));
        assert_eq!(extractor.initialize().await, ModelStatus::Unavailable);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_failure_keeps_ready() {
        let loader = MockLoader {
            fail_calls: true,
            ..MockLoader::ready(Vec::new())
        };
        let loads = Arc::clone(&loader.loads);
        let extractor = ModelExtractor::new(loader);

        assert!(matches!(
            extractor.extract("fever").await,
            Err(DependencyError::CallFailed(_))
        ));
        assert!(extractor.extract("cough").await.is_err());
        assert_eq!(extractor.status().await, ModelStatus::Ready);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_never_loads() {
        let extractor = ModelExtractor::disabled();
        assert_eq!(extractor.status().await, ModelStatus::Unavailable);
        assert!(extractor.extract("fever").await.is_err());
    }

    #[test]
    fn test_parse_entities() {
        let body = serde_json::json!([
            {"entity_group": "Sign_symptom", "word": "fever", "score": 0.93, "start": 0, "end": 5},
            {"entity": "B-Disease_disorder", "word": "flu", "score": 0.71},
            {"entity_group": "Age", "word": "42"}
        ]);
        let spans = parse_entities(body).unwrap();

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], RawSpan::new("Sign_symptom", "fever", 0.93));
        assert_eq!(spans[1].label, "B-Disease_disorder");
        assert_eq!(spans[2].score, 0.0);
    }

    #[test]
    fn test_parse_error_body() {
        let body = serde_json::json!({"error": "Model is currently loading"});
        assert!(matches!(
            parse_entities(body),
            Err(DependencyError::CallFailed(msg)) if msg.contains("loading")
        ));
    }
}
