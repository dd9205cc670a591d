//! Source trait for fetching repository metadata and release feeds

#[cfg(test)]
use mockall::automock;

use crate::release::error::SourceError;
use crate::release::types::{Release, RepositoryMetadata};

/// Trait for fetching releases from a hosting provider
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches metadata for a repository
    ///
    /// # Arguments
    /// * `repository` - Repository identifier (e.g., "owner/name")
    ///
    /// # Returns
    /// * `Ok(RepositoryMetadata)` - Metadata with a template-free release list URL
    /// * `Err(SourceError)` - On non-success status, transport error or error-shaped body
    async fn fetch_repository_metadata(
        &self,
        repository: &str,
    ) -> Result<RepositoryMetadata, SourceError>;

    /// Fetches the release list at `releases_url`
    ///
    /// # Returns
    /// * `Ok(Vec<Release>)` - Releases ordered from newest to oldest
    /// * `Err(SourceError)` - If the fetch fails
    async fn fetch_release_list(&self, releases_url: &str) -> Result<Vec<Release>, SourceError>;
}

/// Remove URI-template segments such as `{/id}` from a provider URL
pub fn strip_url_template(url: &str) -> String {
    let mut stripped = String::with_capacity(url.len());
    let mut depth = 0usize;
    for c in url.chars() {
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }
    stripped
}
