//! MedLens Core - Signal types and domain rules for free-text health reports
//!
//! This crate provides the foundational primitives:
//! - Symptom signals with clamped confidence and normalized names
//! - The keyword lexicon behind the heuristic matcher
//! - Cluster results and the fixed topic buckets used as a clustering fallback
//! - Deterministic cache fingerprints
//! - Advice and misinformation rules layered on top of extraction

pub mod signals;
pub mod lexicon;
pub mod clusters;
pub mod fingerprint;
pub mod advice;
pub mod claims;
pub mod error;

pub use signals::*;
pub use lexicon::*;
pub use clusters::*;
pub use fingerprint::*;
pub use advice::*;
pub use claims::*;
pub use error::*;

/// Lowest confidence a signal may carry
pub const MIN_CONFIDENCE: f64 = 0.0;

/// Highest confidence a signal may carry
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Number of representative terms kept per cluster
pub const TOP_TERMS: usize = 8;

/// Smallest cluster count a caller may request
pub const MIN_CLUSTERS: usize = 2;

/// Cache TTL for signal extraction results, in seconds
pub const EXTRACTION_TTL_SECS: u64 = 3600;

/// Cache TTL for clustering results, in seconds
pub const PATTERNS_TTL_SECS: u64 = 300;
