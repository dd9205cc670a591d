//! Release source test utilities

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use release_channel::release::error::SourceError;
use release_channel::release::source::ReleaseSource;
use release_channel::release::store::SqliteStore;
use release_channel::release::types::{Release, RepositoryMetadata};

pub const RELEASES_URL: &str = "https://api.test/repos/owner/plugin/releases";

/// Build a release whose tag and download reference derive from `name`
pub fn release(name: &str) -> Release {
    Release::new(name, name, format!("https://z/{}.zip", name))
}

/// In-process source with a swappable feed and call counters
pub struct FakeSource {
    releases: Mutex<Vec<Release>>,
    metadata_available: AtomicBool,
    metadata_calls: AtomicUsize,
    release_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(names: &[&str]) -> Self {
        Self {
            releases: Mutex::new(names.iter().map(|name| release(name)).collect()),
            metadata_available: AtomicBool::new(true),
            metadata_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_releases(&self, names: &[&str]) {
        *self.releases.lock().unwrap() = names.iter().map(|name| release(name)).collect();
    }

    pub fn set_metadata_available(&self, available: bool) {
        self.metadata_available.store(available, Ordering::SeqCst);
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.metadata_calls() + self.release_calls()
    }
}

#[async_trait]
impl ReleaseSource for FakeSource {
    async fn fetch_repository_metadata(
        &self,
        repository: &str,
    ) -> Result<RepositoryMetadata, SourceError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if !self.metadata_available.load(Ordering::SeqCst) {
            return Err(SourceError::InvalidResponse(
                "Unexpected status: 503 Service Unavailable".to_string(),
            ));
        }
        Ok(RepositoryMetadata {
            full_name: repository.to_string(),
            releases_url: format!("{}{{/id}}", RELEASES_URL),
        })
    }

    async fn fetch_release_list(&self, releases_url: &str) -> Result<Vec<Release>, SourceError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(releases_url, RELEASES_URL);
        Ok(self.releases.lock().unwrap().clone())
    }
}

/// Create a SQLite store in a temporary directory
pub fn create_test_store() -> (TempDir, SqliteStore) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::new(&db_path).unwrap();
    (temp_dir, store)
}
