//! Source implementations for fetching release feeds

pub mod github;

pub use github::GitHubSource;
