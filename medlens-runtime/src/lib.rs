//! MedLens Runtime - the engine a caller holds
//!
//! Wires the signal fusion, result cache, clustering engine and provider
//! chain behind three contracts (`extract_signals`, `cluster`,
//! `summarize_claims`) plus the composed symptom and misinformation reports.

pub mod engine;
pub mod report;
pub mod settings;

pub use engine::*;
pub use report::*;
pub use settings::*;
