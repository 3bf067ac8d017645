//! Signal fusion
//!
//! Merges keyword-heuristic signals with model spans into one ranked list.
//! Per name the higher confidence wins, so adding either source can only
//! raise a name's confidence. Ranking is by confidence descending; equal
//! scores keep discovery order, heuristic names first.

use std::sync::Arc;
use tracing::{debug, warn};

use medlens_core::{match_symptoms, RawSpan, Signal};

use crate::{ModelExtractor, ModelStatus};

/// Outcome of one fusion call
#[derive(Debug, Clone, PartialEq)]
pub struct FusedSignals {
    pub signals: Vec<Signal>,
    /// A ready model failed this call, so the result is heuristic-only for now
    pub degraded: bool,
}

/// Fuses heuristic and model-derived signals
pub struct SignalFusion {
    model: Arc<ModelExtractor>,
}

impl SignalFusion {
    pub fn new(model: Arc<ModelExtractor>) -> Self {
        Self { model }
    }

    /// Heuristic-only fusion
    pub fn heuristic_only() -> Self {
        Self::new(Arc::new(ModelExtractor::disabled()))
    }

    pub fn model(&self) -> &Arc<ModelExtractor> {
        &self.model
    }

    /// Extract ranked, deduplicated signals from `text`
    ///
    /// Never fails: a model that is unavailable or errors contributes nothing.
    pub async fn extract_signals(&self, text: &str, prefer_model: bool) -> Vec<Signal> {
        self.fuse(text, prefer_model).await.signals
    }

    /// Like [`extract_signals`](Self::extract_signals), also reporting whether
    /// a transient model failure shaped the result
    pub async fn fuse(&self, text: &str, prefer_model: bool) -> FusedSignals {
        let normalized = text.trim();
        if normalized.is_empty() {
            return FusedSignals {
                signals: Vec::new(),
                degraded: false,
            };
        }

        let mut fused = match_symptoms(normalized);
        let mut degraded = false;

        if prefer_model {
            match self.model.extract(normalized).await {
                Ok(spans) => {
                    let model_signals = signals_from_spans(&spans);
                    debug!(
                        "Model contributed {} signals from {} spans",
                        model_signals.len(),
                        spans.len()
                    );
                    merge_max(&mut fused, model_signals);
                }
                Err(e) => {
                    warn!("Model contributed nothing; using heuristics only: {}", e);
                    // Unavailable is terminal; only a failing ready model is transient
                    degraded = self.model.status().await == ModelStatus::Ready;
                }
            }
        }

        rank(&mut fused);
        FusedSignals {
            signals: fused,
            degraded,
        }
    }
}

/// Convert accepted model spans to signals, keeping the best score per name
pub fn signals_from_spans(spans: &[RawSpan]) -> Vec<Signal> {
    let mut signals = Vec::new();
    let accepted = spans
        .iter()
        .filter(|span| span.is_clinical())
        .filter_map(RawSpan::to_signal);

    merge_max(&mut signals, accepted);
    signals
}

/// Merge `incoming` into `signals` by name, keeping the maximum confidence
///
/// Names not yet present are appended in arrival order.
pub fn merge_max(signals: &mut Vec<Signal>, incoming: impl IntoIterator<Item = Signal>) {
    for signal in incoming {
        match signals.iter_mut().find(|s| s.name == signal.name) {
            Some(existing) => {
                if signal.confidence > existing.confidence {
                    existing.confidence = signal.confidence;
                }
            }
            None => signals.push(signal),
        }
    }
}

/// Stable sort by confidence, descending
pub fn rank(signals: &mut [Signal]) {
    signals.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
