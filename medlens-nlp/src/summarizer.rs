//! Claim summaries through a provider fallback chain
//!
//! Attempts run in order: primary provider, secondary provider, static
//! heuristic text. An error or empty answer moves on to the next link;
//! nothing is retried within a call. The heuristic link cannot fail, so a
//! summary is always produced.

use tracing::{debug, error, info};

use medlens_core::{ProviderKind, ProviderResult};

use crate::SharedBackend;

/// System prompt for the primary provider
pub const VALIDATOR_SYSTEM_PROMPT: &str = "You are a careful medical content validator. \
Identify dubious claims and cite reliable sources (NIH, CDC, WHO, Mayo Clinic).";

/// Message prefix for the secondary provider
pub const SECONDARY_PROMPT_PREFIX: &str =
    "Flag dubious medical claims and cite sources for the following text:\n";

/// Text returned when no provider answers
pub const HEURISTIC_SUMMARY: &str = "Using heuristic claim analysis (no API keys configured).";

/// Ordered provider chain
#[derive(Clone, Default)]
pub struct ProviderChain {
    primary: Option<SharedBackend>,
    secondary: Option<SharedBackend>,
}

impl ProviderChain {
    pub fn new(primary: Option<SharedBackend>, secondary: Option<SharedBackend>) -> Self {
        match (&primary, &secondary) {
            (None, None) => info!("No generative providers configured; claim summaries are heuristic"),
            _ => info!(
                "Claim summary chain: primary={} secondary={}",
                primary.as_ref().map_or("none", |b| b.model_name()),
                secondary.as_ref().map_or("none", |b| b.model_name()),
            ),
        }
        Self { primary, secondary }
    }

    /// Chain with only the heuristic link
    pub fn heuristic_only() -> Self {
        Self::default()
    }

    /// Summarize dubious claims in `text`, recording which link answered
    pub async fn summarize(&self, text: &str) -> ProviderResult {
        if let Some(backend) = &self.primary {
            match backend.generate(VALIDATOR_SYSTEM_PROMPT, text).await {
                Ok(summary) if !summary.trim().is_empty() => {
                    info!("Primary provider analysis completed (text_length={})", text.len());
                    return ProviderResult {
                        text: summary,
                        provider: ProviderKind::Primary,
                    };
                }
                Ok(_) => debug!("Primary provider returned an empty summary"),
                Err(e) => error!("Primary provider analysis failed: {}", e),
            }
        }

        if let Some(backend) = &self.secondary {
            let message = format!("{SECONDARY_PROMPT_PREFIX}{text}");
            match backend.generate("", &message).await {
                Ok(summary) if !summary.trim().is_empty() => {
                    info!("Secondary provider analysis completed (text_length={})", text.len());
                    return ProviderResult {
                        text: summary,
                        provider: ProviderKind::Secondary,
                    };
                }
                Ok(_) => debug!("Secondary provider returned an empty summary"),
                Err(e) => error!("Secondary provider analysis failed: {}", e),
            }
        }

        info!("Using heuristic claim analysis");
        ProviderResult {
            text: HEURISTIC_SUMMARY.to_string(),
            provider: ProviderKind::Heuristic,
        }
    }

    /// Claim summaries as plain text; always exactly one element
    pub async fn summarize_claims(&self, text: &str) -> Vec<String> {
        vec![self.summarize(text).await.text]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LlmBackend, LlmError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Reply {
        Text(&'static str),
        Empty,
        Fail,
    }

    struct MockBackend {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn shared(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Empty => Ok("  ".to_string()),
                Reply::Fail => Err(LlmError::Api("boom".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_primary_answers_first() {
        let primary = MockBackend::shared(Reply::Text("claim A is dubious"));
        let secondary = MockBackend::shared(Reply::Text("unused"));
        let chain = ProviderChain::new(Some(primary.clone()), Some(secondary.clone()));

        let result = chain.summarize("detox tea cures flu").await;
        assert_eq!(result.provider, ProviderKind::Primary);
        assert_eq!(result.text, "claim A is dubious");
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_primary_falls_to_secondary() {
        let primary = MockBackend::shared(Reply::Fail);
        let secondary = MockBackend::shared(Reply::Text("secondary view"));
        let chain = ProviderChain::new(Some(primary.clone()), Some(secondary));

        let result = chain.summarize("detox tea cures flu").await;
        assert_eq!(result.provider, ProviderKind::Secondary);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_providers_failing_yields_heuristic() {
        let primary = MockBackend::shared(Reply::Fail);
        let secondary = MockBackend::shared(Reply::Empty);
        let chain = ProviderChain::new(Some(primary.clone()), Some(secondary.clone()));

        let summaries = chain.summarize_claims("detox tea cures flu").await;
        assert_eq!(summaries, vec![HEURISTIC_SUMMARY.to_string()]);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_chain_is_heuristic() {
        let result = ProviderChain::heuristic_only().summarize("anything").await;
        assert_eq!(result.provider, ProviderKind::Heuristic);
    }
}
