//! Host collaborator contracts.
//!
//! The engine never talks to the network or the router itself. The embedder
//! hands it three objects: an async [`PortalBackend`] for entity data and
//! feature flags, an async [`UserDataStore`] for per-user persistence, and a
//! synchronous [`Shell`] for navigation, command dispatch, and URL
//! parameters. Every call is allowed to fail; callers degrade instead of
//! propagating.

pub mod cache;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SearchItem;

pub use cache::{TtlCache, VolatileCache};

/// Errors crossing the collaborator boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Assessment row as the portal backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub id: i64,
    pub metaclass_id: i64,
    pub title: String,
    pub code: String,
    pub subject: String,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
}

/// Course row as the portal backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub programme: i64,
    pub metaclass: i64,
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Entity data and feature flags from the portal.
#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// Server-side keyword search, bounded by `limit`.
    async fn search_assessments(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AssessmentSummary>, BackendError>;

    async fn search_courses(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CourseSummary>, BackendError>;

    /// Full dataset, used when keyword search is unavailable.
    async fn fetch_assessments(&self) -> Result<Vec<AssessmentSummary>, BackendError>;

    async fn fetch_courses(&self) -> Result<Vec<CourseSummary>, BackendError>;

    /// Flag map gating optional portal pages. Missing keys count as
    /// unresolved, which never hides a page.
    async fn feature_flags(&self) -> Result<HashMap<String, bool>, BackendError>;
}

/// Per-user palette state lives behind this store.
#[async_trait]
pub trait UserDataStore: Send + Sync {
    async fn favorites(&self) -> Result<Vec<String>, BackendError>;

    async fn add_favorite(&self, id: &str) -> Result<(), BackendError>;

    async fn remove_favorite(&self, id: &str) -> Result<(), BackendError>;

    async fn recent_items(&self, limit: usize) -> Result<Vec<SearchItem>, BackendError>;

    async fn history(&self, limit: usize) -> Result<Vec<String>, BackendError>;

    async fn append_history(&self, query: &str) -> Result<(), BackendError>;

    /// Bump server-side usage counters for a selected item.
    async fn track_usage(&self, item_id: &str, kind: &str) -> Result<(), BackendError>;
}

/// Synchronous host surface the selection path drives.
pub trait Shell: Send + Sync {
    fn navigate(&self, path: &str);

    /// Run the side effect registered for an action id.
    fn dispatch_command(&self, id: &str);

    /// Raised instead of a generic dispatch for the sidebar action.
    fn toggle_sidebar(&self);

    fn read_url_param(&self, name: &str) -> Option<String>;

    /// `None` removes the parameter; `replace` rewrites the current history
    /// entry instead of pushing a new one.
    fn write_url_param(&self, name: &str, value: Option<&str>, replace: bool);
}
