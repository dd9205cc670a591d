//! GitHub REST API release source

use reqwest::Response;
use serde::Deserialize;
use tracing::warn;

use crate::release::error::SourceError;
use crate::release::source::{ReleaseSource, strip_url_template};
use crate::release::types::{Release, RepositoryMetadata};

/// Default base URL for GitHub API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Response from the GitHub repository endpoint
#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
    releases_url: String,
}

/// Entry from the GitHub releases endpoint
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    #[serde(default)]
    name: Option<String>,
    tag_name: String,
    zipball_url: String,
}

impl From<GitHubRelease> for Release {
    fn from(release: GitHubRelease) -> Self {
        let raw_name = release
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| release.tag_name.clone());
        Release {
            raw_name,
            tag_reference: release.tag_name,
            artifact_url: release.zipball_url,
        }
    }
}

/// Release source backed by the GitHub REST API
pub struct GitHubSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubSource {
    /// Creates a new GitHubSource with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("release-channel")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Authenticate requests with a personal access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn get(&self, url: &str, accept: &str) -> Result<Response, SourceError> {
        let mut request = self.client.get(url).header("Accept", accept);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        check_status(response, url)
    }

    /// Fetch a file from the repository at `tag_reference`, e.g. the readme
    pub async fn fetch_companion_file(
        &self,
        repository: &str,
        tag_reference: &str,
        path: &str,
    ) -> Result<String, SourceError> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.base_url, repository, path, tag_reference
        );
        let response = self.get(&url, "application/vnd.github.raw+json").await?;
        Ok(response.text().await?)
    }
}

impl Default for GitHubSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn check_status(response: Response, url: &str) -> Result<Response, SourceError> {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(url.to_string()));
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(SourceError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        warn!("GitHub API returned status {}: {}", status, url);
        return Err(SourceError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    Ok(response)
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubSource {
    async fn fetch_repository_metadata(
        &self,
        repository: &str,
    ) -> Result<RepositoryMetadata, SourceError> {
        let url = format!("{}/repos/{}", self.base_url, repository);
        let response = self.get(&url, "application/vnd.github+json").await?;

        let repo: Repository = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub repository response: {}", e);
            SourceError::InvalidResponse(e.to_string())
        })?;

        Ok(RepositoryMetadata {
            full_name: repo.full_name,
            releases_url: strip_url_template(&repo.releases_url),
        })
    }

    async fn fetch_release_list(&self, releases_url: &str) -> Result<Vec<Release>, SourceError> {
        let response = self
            .get(releases_url, "application/vnd.github+json")
            .await?;

        let releases: Vec<GitHubRelease> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            SourceError::InvalidResponse(e.to_string())
        })?;

        Ok(releases.into_iter().map(Release::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn fetch_repository_metadata_strips_release_url_template() {
        let mut server = Server::new_async().await;
        let releases_url = format!("{}/repos/owner/plugin/releases{{/id}}", server.url());

        let mock = server
            .mock("GET", "/repos/owner/plugin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "full_name": "owner/plugin",
                    "html_url": "https://github.com/owner/plugin",
                    "releases_url": releases_url,
                })
                .to_string(),
            )
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let metadata = source
            .fetch_repository_metadata("owner/plugin")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            metadata,
            RepositoryMetadata {
                full_name: "owner/plugin".to_string(),
                releases_url: format!("{}/repos/owner/plugin/releases", server.url()),
            }
        );
    }

    #[tokio::test]
    async fn fetch_repository_metadata_rejects_error_shaped_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/plugin")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Bad credentials"}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repository_metadata("owner/plugin").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SourceError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn fetch_repository_metadata_returns_not_found_for_nonexistent_repo() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/nonexistent/repo")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repository_metadata("nonexistent/repo").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_release_list_preserves_feed_order() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/plugin/releases")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"name": "v2.0.0-beta1", "tag_name": "v2.0.0-beta1", "zipball_url": "https://z/2.0.0-beta1"},
                    {"name": null, "tag_name": "v1.9.0", "zipball_url": "https://z/1.9.0"},
                    {"name": "", "tag_name": "v1.8.0", "zipball_url": "https://z/1.8.0"}
                ]"#,
            )
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let releases = source
            .fetch_release_list(&format!("{}/repos/owner/plugin/releases", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            releases,
            vec![
                Release::new("v2.0.0-beta1", "v2.0.0-beta1", "https://z/2.0.0-beta1"),
                Release::new("v1.9.0", "v1.9.0", "https://z/1.9.0"),
                Release::new("v1.8.0", "v1.8.0", "https://z/1.8.0"),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_release_list_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/plugin/releases")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_header("retry-after", "60")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source
            .fetch_release_list(&format!("{}/repos/owner/plugin/releases", server.url()))
            .await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SourceError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn fetch_release_list_returns_invalid_response_for_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/plugin/releases")
            .with_status(502)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source
            .fetch_release_list(&format!("{}/repos/owner/plugin/releases", server.url()))
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SourceError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn fetch_companion_file_reads_file_at_tag() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/plugin/contents/README.md")
            .match_query(mockito::Matcher::UrlEncoded("ref".into(), "v1.9.0".into()))
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body("# Plugin\n")
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url()).with_token("secret");
        let readme = source
            .fetch_companion_file("owner/plugin", "v1.9.0", "README.md")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(readme, "# Plugin\n");
    }
}
