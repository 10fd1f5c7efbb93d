//! Trait seam between the pipeline and the upstream API client.
//!
//! The orchestrator, container discovery, and enricher are generic over
//! [`UpstreamApi`] so tests can substitute scripted implementations without
//! a network. The HTTP implementation is [`crate::client::ClickUpClient`].

use std::future::Future;

use crate::error::Result;
use crate::types::{FolderListing, ListListing, RawActivity, RawComment, RawTask};

/// Read-only view of the upstream project-management API.
///
/// Implementations must be `Send + Sync`; the enrichment stage shares one
/// instance across its concurrent per-task sub-requests.
pub trait UpstreamApi: Send + Sync {
    /// Folders under a scope, each with its nested lists.
    fn fetch_folders(
        &self,
        scope_id: &str,
    ) -> impl Future<Output = Result<Vec<FolderListing>>> + Send;

    /// Standalone lists directly under a scope, including hidden ones.
    fn fetch_lists(
        &self,
        scope_id: &str,
    ) -> impl Future<Output = Result<Vec<ListListing>>> + Send;

    /// Tasks in a list, optionally bounded below by an update timestamp
    /// (exclusive, epoch milliseconds).
    fn fetch_tasks(
        &self,
        list_id: &str,
        updated_after_ms: Option<i64>,
        include_closed: bool,
    ) -> impl Future<Output = Result<Vec<RawTask>>> + Send;

    /// Comments for a task, in upstream response order.
    fn fetch_comments(
        &self,
        task_id: &str,
    ) -> impl Future<Output = Result<Vec<RawComment>>> + Send;

    /// Activity history for a task, in upstream response order.
    fn fetch_history(
        &self,
        task_id: &str,
    ) -> impl Future<Output = Result<Vec<RawActivity>>> + Send;
}
