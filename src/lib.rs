//! # clickup-report
//!
//! A simplified task-reporting view over the ClickUp v2 API.
//!
//! This crate aggregates the tasks of a scope (a space) across every task
//! container under it, enriches them with comments and activity history,
//! and filters the result with timezone-aware day windows. It is a
//! library: route registration, environment loading, and process startup
//! belong to the caller.
//!
//! ## Design
//!
//! - Discovers containers from two upstream listings (folders with nested
//!   lists, plus standalone/hidden lists) and queries each one
//! - Projects raw tasks onto a fixed field allow-list with capped text
//! - Enriches every task concurrently through a bounded worker pool;
//!   per-task enrichment failures degrade to empty lists
//! - Keeps a task when its update timestamp OR any enriched comment or
//!   activity timestamp falls inside the requested window
//! - Falls back to the last per-scope snapshot on upstream outages, while
//!   rejected (non-2xx) responses surface as typed errors
//!
//! ## Security
//!
//! - The credential travels only in the request header and never appears
//!   in errors or logs
//! - No network listeners: this is a library, not a server
//! - Scope ids are sanitized before deriving snapshot file names

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod discovery;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod orchestrator;
pub mod project;
pub mod types;

pub use api::UpstreamApi;
pub use cache::SnapshotStore;
pub use client::ClickUpClient;
pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use types::{ProjectedTask, Report, ReportOptions};

/// Build the task report for a scope against the real upstream API.
///
/// Validates the configuration and the request, then runs the full
/// pipeline: container discovery, per-container task fetch, projection,
/// enrichment, time-window filtering, and the snapshot fallback policy.
///
/// # Errors
///
/// [`ReportError::Validation`] for a missing scope id or credential,
/// [`ReportError::Config`] for an invalid configuration,
/// [`ReportError::UpstreamStatus`] when the upstream rejects a call, and
/// [`ReportError::Connect`] when the upstream is unreachable and no
/// snapshot exists for the scope.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> clickup_report::Result<()> {
/// let config = clickup_report::ReportConfig::default();
/// let options = clickup_report::ReportOptions::default();
/// let report = clickup_report::report("90210", "pk_token", &options, &config).await?;
/// for task in &report.tasks {
///     println!("{}: {:?}", task.name, task.status);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn report(
    scope_id: &str,
    credential: &str,
    options: &ReportOptions,
    config: &ReportConfig,
) -> Result<Report> {
    config.validate()?;
    validate_request(scope_id, options)?;
    if credential.trim().is_empty() {
        return Err(ReportError::Validation(
            "credential must not be empty".into(),
        ));
    }

    let client = ClickUpClient::new(credential, config)?;
    let store = SnapshotStore::new(config.cache_dir.clone());
    orchestrator::run_report(&client, &store, scope_id, options, config).await
}

/// Run the pipeline against any [`UpstreamApi`] implementation and an
/// explicit snapshot store.
///
/// This is the seam the HTTP-backed [`report`] goes through; callers with
/// their own transport (or tests with scripted backends) use it directly.
///
/// # Errors
///
/// Same as [`report`], minus the credential validation: the supplied API
/// implementation already carries whatever credential it needs.
pub async fn report_with<A: UpstreamApi>(
    api: &A,
    store: &SnapshotStore,
    scope_id: &str,
    options: &ReportOptions,
    config: &ReportConfig,
) -> Result<Report> {
    config.validate()?;
    validate_request(scope_id, options)?;
    orchestrator::run_report(api, store, scope_id, options, config).await
}

fn validate_request(scope_id: &str, options: &ReportOptions) -> Result<()> {
    if scope_id.trim().is_empty() {
        return Err(ReportError::Validation("scope id must not be empty".into()));
    }
    if !(-23..=23).contains(&options.utc_offset_hours) {
        return Err(ReportError::Validation(
            "utc_offset_hours must be between -23 and 23".into(),
        ));
    }
    Ok(())
}
