//! Cached update checks for tracked components

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::FETCH_STAGGER_DELAY_MS;
use crate::release::cache::{CacheStore, DecisionCache, cache_key};
use crate::release::channel::ChannelLevel;
use crate::release::decider::decide;
use crate::release::selector::select_latest;
use crate::release::source::{ReleaseSource, strip_url_template};
use crate::release::types::{Release, ReleaseDecision};

/// One component to check, with everything the check needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// Stable identity of the component, used for the cache key
    pub slug: String,
    /// Repository identifier (e.g., "owner/name")
    pub repository: String,
    pub installed_version: String,
    pub minimum: ChannelLevel,
}

impl CheckRequest {
    pub fn cache_key(&self) -> String {
        cache_key(&self.slug, self.minimum)
    }
}

pub struct UpdateChecker<S: CacheStore> {
    source: Arc<dyn ReleaseSource>,
    cache: DecisionCache<S>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S: CacheStore> UpdateChecker<S> {
    pub fn new(source: Arc<dyn ReleaseSource>, cache: DecisionCache<S>) -> Self {
        Self {
            source,
            cache,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &DecisionCache<S> {
        &self.cache
    }

    fn key_lock(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Decide whether an update is available, consulting the cache first
    ///
    /// A fresh cache entry is reused without touching the network; its
    /// selected release is re-evaluated against the current installed version.
    /// Returns `None` when no entry is fresh and upstream data is unavailable.
    pub async fn check_for_update(&self, request: &CheckRequest) -> Option<ReleaseDecision> {
        let key = request.cache_key();
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        let cached = self
            .cache
            .get(&key)
            .inspect_err(|e| error!("Failed to read cache entry {}: {}", key, e))
            .ok()
            .flatten();

        if let Some(entry) = cached {
            debug!("Using cached selection for {} from {}", key, entry.resolved_at);
            return Some(decide(entry.selected_release.as_ref(), &request.installed_version));
        }

        self.resolve_and_store(&key, request).await
    }

    /// Resolve from upstream regardless of cache freshness
    ///
    /// On upstream failure the existing entry is left as it was.
    pub async fn refresh(&self, request: &CheckRequest) -> Option<ReleaseDecision> {
        let key = request.cache_key();
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        self.resolve_and_store(&key, request).await
    }

    async fn resolve_and_store(
        &self,
        key: &str,
        request: &CheckRequest,
    ) -> Option<ReleaseDecision> {
        let selected = self.resolve(request).await?;

        let _ = self
            .cache
            .put(key, selected.clone())
            .inspect_err(|e| error!("Failed to save cache entry {}: {}", key, e));

        Some(decide(selected.as_ref(), &request.installed_version))
    }

    /// Fetch the feed and select a release; the outer `None` means upstream failed
    async fn resolve(&self, request: &CheckRequest) -> Option<Option<Release>> {
        let metadata = self
            .source
            .fetch_repository_metadata(&request.repository)
            .await
            .inspect_err(|e| {
                warn!("Failed to fetch repository metadata for {}: {}", request.repository, e)
            })
            .ok()?;

        let releases_url = strip_url_template(&metadata.releases_url);
        let releases = self
            .source
            .fetch_release_list(&releases_url)
            .await
            .inspect_err(|e| warn!("Failed to fetch releases for {}: {}", request.repository, e))
            .ok()?;

        info!("Fetched {} releases for {}", releases.len(), metadata.full_name);

        let selected = select_latest(&releases, request.minimum);
        if selected.is_none() {
            info!(
                "No release of {} qualifies for the {} channel",
                request.repository, request.minimum
            );
        }

        Some(selected.cloned())
    }

    /// Check several components concurrently
    ///
    /// Starts are staggered to avoid rate limiting. Results are returned in
    /// request order.
    pub async fn check_all(&self, requests: &[CheckRequest]) -> Vec<Option<ReleaseDecision>> {
        let futures = requests.iter().enumerate().map(|(i, request)| {
            let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
            async move {
                sleep(delay).await;
                self.check_for_update(request).await
            }
        });

        join_all(futures).await
    }
}
