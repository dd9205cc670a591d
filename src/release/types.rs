//! Release and decision records

use serde::{Deserialize, Serialize};

/// One entry from the upstream release feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Name as reported by the feed, e.g. `"v1.2.0-beta3"`
    pub raw_name: String,
    /// Tag used to fetch companion files such as the readme
    pub tag_reference: String,
    /// Opaque download reference
    pub artifact_url: String,
}

impl Release {
    pub fn new(
        raw_name: impl Into<String>,
        tag_reference: impl Into<String>,
        artifact_url: impl Into<String>,
    ) -> Self {
        Self {
            raw_name: raw_name.into(),
            tag_reference: tag_reference.into(),
            artifact_url: artifact_url.into(),
        }
    }
}

/// Repository metadata needed to locate the release list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub full_name: String,
    /// Release list URL with templated segments already removed
    pub releases_url: String,
}

/// Outcome of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDecision {
    pub selected_release: Option<Release>,
    pub update_available: bool,
    pub target_version: Option<String>,
    pub download_reference: Option<String>,
}
