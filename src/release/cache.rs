//! TTL-bounded decision cache
//!
//! A [`DecisionCache`] serializes [`CacheEntry`] values into a [`CacheStore`].
//! Stores only hand back unexpired values, so a `None` from [`DecisionCache::get`]
//! covers both the absent and the stale state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CACHE_TTL_MS;
use crate::release::channel::ChannelLevel;
use crate::release::error::CacheError;
use crate::release::types::Release;

/// Bumped whenever the serialized [`CacheEntry`] layout changes
pub const CACHE_SCHEMA_VERSION: u32 = 2;

/// Fixed lifetime of a resolved decision
pub const CACHE_TTL: Duration = Duration::from_millis(CACHE_TTL_MS as u64);

/// Key-value persistence for serialized cache entries
pub trait CacheStore: Send + Sync + 'static {
    /// Returns the stored value if it has not expired
    fn load(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value`, replacing any previous value and expiry for `key`
    fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

impl<T: CacheStore> CacheStore for Arc<T> {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        (**self).save(key, value, ttl)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub schema_version: u32,
    pub resolved_at: DateTime<Utc>,
    /// `None` when no release qualified for the channel
    pub selected_release: Option<Release>,
}

/// Current time in milliseconds since UNIX epoch
pub(crate) fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Expiry timestamp for a value saved now with `ttl`
pub(crate) fn expiry_timestamp_ms(ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    current_timestamp_ms().saturating_add(ttl_ms)
}

/// Cache key for a component tracked on a given channel
pub fn cache_key(slug: &str, channel: ChannelLevel) -> String {
    format!("{}:{}", slug, channel.as_str())
}

pub struct DecisionCache<S: CacheStore> {
    store: S,
    ttl: Duration,
}

impl<S: CacheStore> DecisionCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_ttl(store, CACHE_TTL)
    }

    pub fn with_ttl(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fresh entry for `key`, if any
    ///
    /// Entries written with a different schema version read as absent.
    pub fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let Some(raw) = self.store.load(key)? else {
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Discarding unreadable cache entry for {}: {}", key, e);
                return Ok(None);
            }
        };

        if entry.schema_version != CACHE_SCHEMA_VERSION {
            debug!("Discarding cache entry for {} with schema v{}", key, entry.schema_version);
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Replace the entry for `key` with `selected_release`, restarting its TTL
    pub fn put(
        &self,
        key: &str,
        selected_release: Option<Release>,
    ) -> Result<CacheEntry, CacheError> {
        let entry = CacheEntry {
            schema_version: CACHE_SCHEMA_VERSION,
            resolved_at: Utc::now(),
            selected_release,
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.save(key, &raw, self.ttl)?;
        debug!("Cached selection for {} (ttl {:?})", key, self.ttl);
        Ok(entry)
    }

    pub fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key)
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, i64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<String, (String, i64)>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::LockPoisoned)
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.lock_entries()?;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > current_timestamp_ms())
            .map(|(value, _)| value.clone()))
    }

    fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = expiry_timestamp_ms(ttl);
        self.lock_entries()?
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock_entries()?.remove(key);
        Ok(())
    }
}
