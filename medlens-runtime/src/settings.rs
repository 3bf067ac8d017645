//! Engine construction from plain settings
//!
//! Each optional collaborator is configured independently. Anything that
//! cannot be constructed is logged and left out, so a bad key or an
//! unreachable store never prevents the engine from starting.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use medlens_nlp::{
    create_backend, create_cohere_backend, ClusterEngine, CohereConfig, HuggingFaceLoader,
    MemoryStore, ModelExtractor, NerConfig, OpenAIBackendConfig, ProviderChain, ResultCache,
    SharedBackend, DEFAULT_MEMORY_CAPACITY, DEFAULT_STORE_TIMEOUT,
};

use crate::{Engine, EngineConfig};

/// Settings for building an [`Engine`]
#[derive(Debug, Clone)]
pub struct Settings {
    /// NER model; `None` runs heuristic-only extraction
    pub ner: Option<NerConfig>,
    /// Primary claim-summary provider
    pub openai: Option<OpenAIBackendConfig>,
    /// Secondary claim-summary provider
    pub cohere: Option<CohereConfig>,
    /// Use the in-process result cache
    pub cache_enabled: bool,
    /// Result cache capacity, in entries
    pub cache_capacity: usize,
    /// Upper bound on each cache store call
    pub cache_timeout: Duration,
    /// Initialize the NER model before returning the engine
    pub eager_model: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ner: None,
            openai: None,
            cohere: None,
            cache_enabled: true,
            cache_capacity: DEFAULT_MEMORY_CAPACITY,
            cache_timeout: DEFAULT_STORE_TIMEOUT,
            eager_model: false,
        }
    }
}

impl Settings {
    /// Build the engine, degrading every collaborator that fails to construct
    pub async fn build(self) -> Engine {
        let model = match self.ner {
            Some(config) => {
                info!("NER model configured: {}", config.model);
                ModelExtractor::new(HuggingFaceLoader::new(config))
            }
            None => {
                info!("NER model disabled; using heuristic extraction");
                ModelExtractor::disabled()
            }
        };

        let primary = self.openai.and_then(|config| {
            optional_backend("OpenAI", create_backend(config))
        });
        let secondary = self.cohere.and_then(|config| {
            optional_backend("Cohere", create_cohere_backend(config))
        });

        let cache = if self.cache_enabled {
            ResultCache::connect(Arc::new(MemoryStore::new(self.cache_capacity)))
                .await
                .with_timeout(self.cache_timeout)
        } else {
            info!("Result cache disabled by configuration");
            ResultCache::disabled()
        };

        let engine = Engine::new(EngineConfig {
            model: Arc::new(model),
            chain: ProviderChain::new(primary, secondary),
            cache,
            clusters: ClusterEngine::new(),
            ..Default::default()
        });

        if self.eager_model {
            let status = engine.warm_up().await;
            info!("NER model status after warm-up: {:?}", status);
        }

        engine
    }
}

fn optional_backend<E: std::fmt::Display>(
    name: &str,
    backend: Result<SharedBackend, E>,
) -> Option<SharedBackend> {
    match backend {
        Ok(backend) => {
            info!("{} provider initialized ({})", name, backend.model_name());
            Some(backend)
        }
        Err(e) => {
            warn!("{} provider unavailable: {}", name, e);
            None
        }
    }
}
