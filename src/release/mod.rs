//! Release classification, selection and decision caching
//!
//! This module decides which release in a repository's feed is an eligible
//! update for an installed version, given a minimum release channel, and
//! caches that decision for a fixed TTL.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   Checker   │────▶│    Cache    │
//! │  (fetch)    │     │ (per-key)   │     │ (TTL store) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!       ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!       │     Tag     │ │  Selector   │ │   Decider   │
//!       │  (parse)    │ │ (channel)   │ │ (compare)   │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`tag`]: Release name parsing into numeric core and marker
//! - [`channel`]: Channel levels and the marker table
//! - [`selector`]: First acceptable release in feed order
//! - [`decider`]: Version ordering and update decisions
//! - [`cache`]: Decision cache and the `CacheStore` trait
//! - [`store`]: SQLite-backed `CacheStore`
//! - [`source`]: Source trait for repository metadata and release lists
//! - [`sources`]: Concrete sources (GitHub)
//! - [`checker`]: Cached update checks
//! - [`error`]: Error types for cache, source and config operations
//! - [`types`]: `Release`, `RepositoryMetadata` and `ReleaseDecision`

pub mod cache;
pub mod channel;
pub mod checker;
pub mod decider;
pub mod error;
pub mod selector;
pub mod source;
pub mod sources;
pub mod store;
pub mod tag;
pub mod types;
