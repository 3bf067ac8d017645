//! Result cache
//!
//! A read-through/write-through cache for computed results, keyed by
//! fingerprints from `medlens_core::fingerprint`. The cache is an
//! optimization only: every read failure is a miss and every write failure
//! is dropped. When no store answers at startup the cache runs disabled and
//! behaves as an always-miss, always-accept sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on a single store call made on behalf of a caller
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(250);

/// Default number of entries kept by [`MemoryStore`]
pub const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// Cache store errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store is full")]
    Full,

    #[error("invalid ttl: {0}")]
    InvalidTtl(String),
}

/// A stored value with its expiry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    /// JSON-encoded payload
    pub value: String,
    pub expiry: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}

/// Key-value store with per-key TTL
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Check the store is reachable
    async fn ping(&self) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// Thread-safe reference to a cache store
pub type SharedStore = Arc<dyn CacheStore>;

/// In-process store backed by a concurrent map
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Utc::now();
        // The map guard must be released before any removal on the same shard
        let hit = self
            .entries
            .get(key)
            .map(|entry| (entry.is_expired(now), entry.value.clone()));

        match hit {
            Some((false, value)) => Ok(Some(value)),
            Some((true, _)) => {
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            self.purge_expired();
            if self.entries.len() >= self.capacity {
                return Err(CacheError::Full);
            }
        }

        let ttl = chrono::Duration::from_std(ttl).map_err(|e| CacheError::InvalidTtl(e.to_string()))?;
        let expiry = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| CacheError::InvalidTtl("expiry out of range".to_string()))?;

        let entry = CacheEntry {
            key: key.to_string(),
            value,
            expiry,
        };
        self.entries.insert(entry.key.clone(), entry);
        Ok(())
    }
}

/// Cache capability: backed by a store, or disabled
#[derive(Clone)]
pub enum ResultCache {
    Backed {
        store: SharedStore,
        timeout: Duration,
    },
    Disabled,
}

impl ResultCache {
    /// Probe `store` once; an unreachable store yields a disabled cache
    pub async fn connect(store: SharedStore) -> Self {
        match store.ping().await {
            Ok(()) => {
                info!("Result cache connected");
                Self::Backed {
                    store,
                    timeout: DEFAULT_STORE_TIMEOUT,
                }
            }
            Err(e) => {
                warn!("Result cache unavailable; proceeding without cache: {}", e);
                Self::Disabled
            }
        }
    }

    /// In-process cache
    pub fn memory(capacity: usize) -> Self {
        Self::Backed {
            store: Arc::new(MemoryStore::new(capacity)),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn disabled() -> Self {
        Self::Disabled
    }

    /// Override the per-call store timeout
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            Self::Backed { store, .. } => Self::Backed { store, timeout },
            Self::Disabled => Self::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Backed { .. })
    }

    /// Read and decode a cached value; any failure reads as a miss
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let Self::Backed { store, timeout } = self else {
            return None;
        };

        let raw = match tokio::time::timeout(*timeout, store.get(key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                debug!("Cache miss: {}", key);
                return None;
            }
            Ok(Err(e)) => {
                debug!("Cache read failed for {}: {}", key, e);
                return None;
            }
            Err(_) => {
                debug!("Cache read timed out for {}", key);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                debug!("Cached value for {} did not decode: {}", key, e);
                None
            }
        }
    }

    /// Encode and store a value; failures are dropped
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Self::Backed { store, timeout } = self else {
            return;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Cache value for {} did not encode: {}", key, e);
                return;
            }
        };

        match tokio::time::timeout(*timeout, store.set(key, raw, ttl)).await {
            Ok(Ok(())) => debug!("Cached {} for {}s", key, ttl.as_secs()),
            Ok(Err(e)) => debug!("Cache write dropped for {}: {}", key, e),
            Err(_) => debug!("Cache write timed out for {}", key),
        }
    }
}
