//! Errors from optional dependencies

use thiserror::Error;

/// Failure of an optional collaborator (model, vector math, cache store)
///
/// Never surfaced to callers of the engine; every site that produces one
/// has a fallback branch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// Not reachable, not configured, or not compiled in
    #[error("dependency unavailable: {0}")]
    Unavailable(String),

    /// A single call failed
    #[error("dependency call failed: {0}")]
    CallFailed(String),
}

impl DependencyError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn call_failed(msg: impl Into<String>) -> Self {
        Self::CallFailed(msg.into())
    }
}
