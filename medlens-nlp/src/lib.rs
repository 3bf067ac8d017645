//! MedLens NLP
//!
//! Everything that depends on an optional collaborator, each with a
//! degrade path:
//! - **Model**: lazily initialized NER extractor (Hugging Face inference)
//! - **Fusion**: merges model spans with the keyword heuristic
//! - **Cache**: result cache that turns into a no-op when no store is reachable
//! - **Cluster**: TF-IDF + k-means clustering with a topic-bucket fallback
//! - **Summarizer**: primary → secondary → static provider chain for claim review

pub mod error;
pub mod backend;
pub mod model;
pub mod fusion;
pub mod cache;
#[cfg(feature = "vector-space")]
pub mod vectorize;
#[cfg(feature = "vector-space")]
pub mod kmeans;
pub mod cluster;
pub mod summarizer;

pub use error::*;
pub use backend::*;
pub use model::*;
pub use fusion::*;
pub use cache::*;
#[cfg(feature = "vector-space")]
pub use vectorize::*;
#[cfg(feature = "vector-space")]
pub use kmeans::*;
pub use cluster::*;
pub use summarizer::*;
