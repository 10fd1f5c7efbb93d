//! End-to-end report pipeline.
//!
//! Happy path: discover containers, fetch updated tasks per container,
//! project, enrich, write the snapshot, filter, respond. When the upstream
//! cannot be reached at the discovery/listing level, the last snapshot for
//! the scope is filtered with the current request's options instead. A
//! rejected (non-2xx) upstream response propagates as an error; the cache
//! only papers over outages, not caller mistakes.

use chrono::Utc;

use crate::api::UpstreamApi;
use crate::cache::SnapshotStore;
use crate::config::ReportConfig;
use crate::discovery::discover_containers;
use crate::enrich::enrich_tasks;
use crate::error::{ReportError, Result};
use crate::filter::{filter_tasks, DAY_MS};
use crate::project::project;
use crate::types::{ProjectedTask, Report, ReportOptions, Snapshot};

use super::outcome;

/// Run the report pipeline for one scope, falling back to the snapshot
/// store when the upstream is unreachable.
pub async fn run_report<A: UpstreamApi>(
    api: &A,
    store: &SnapshotStore,
    scope_id: &str,
    options: &ReportOptions,
    config: &ReportConfig,
) -> Result<Report> {
    let lookback_days = options.lookback_days.unwrap_or(config.lookback_days);

    match fetch_live(api, store, scope_id, options, config, lookback_days).await {
        Ok(report) => Ok(report),
        Err(ReportError::Connect(message)) => {
            tracing::warn!(scope_id, error = %message, "upstream unreachable, trying snapshot");
            match store.read(scope_id).await {
                Some(snapshot) => Ok(respond_from_snapshot(
                    snapshot,
                    options,
                    lookback_days,
                )),
                None => Err(ReportError::Connect(message)),
            }
        }
        Err(other) => Err(other),
    }
}

/// The primary pipeline: everything up to and including the cache write
/// and the final filter.
async fn fetch_live<A: UpstreamApi>(
    api: &A,
    store: &SnapshotStore,
    scope_id: &str,
    options: &ReportOptions,
    config: &ReportConfig,
    lookback_days: u32,
) -> Result<Report> {
    // DISCOVER
    let containers = discover_containers(api, scope_id).await?;

    // FETCH_PER_CONTAINER + PROJECT
    let cutoff = Utc::now().timestamp_millis() - i64::from(lookback_days) * DAY_MS;
    let mut tasks: Vec<ProjectedTask> = Vec::new();
    for container in &containers {
        let raw = api
            .fetch_tasks(&container.id, Some(cutoff), options.include_closed)
            .await?;
        if raw.is_empty() {
            continue;
        }
        tasks.extend(raw.iter().map(|task| {
            let mut projected = project(task, config.text_budget);
            projected.list_id = Some(container.id.clone());
            projected.list_name = Some(container.name.clone());
            projected.folder_id = container.folder_id.clone();
            projected.folder_name = container.folder_name.clone();
            projected
        }));
    }
    tracing::debug!(
        scope_id,
        lookback_days,
        containers = containers.len(),
        tasks = tasks.len(),
        "windowed fetch complete"
    );

    if tasks.is_empty() {
        return outcome::empty_fetch_outcome(api, &containers, scope_id, lookback_days, options)
            .await;
    }

    // ENRICH
    let mut enriched = enrich_tasks(api, tasks, options, config).await;
    sort_newest_first(&mut enriched);

    // The snapshot keeps the richest set: projected and enriched, but not
    // yet filtered, so one entry serves future requests with different
    // windows.
    store
        .write(&Snapshot {
            scope_id: scope_id.to_string(),
            saved_at_ms: Utc::now().timestamp_millis(),
            tasks: enriched.clone(),
        })
        .await;

    // FILTER + RESPOND
    let filtered = filter_tasks(enriched, options);
    if filtered.is_empty() {
        return Ok(Report::empty(outcome::no_activity_message(
            options,
            lookback_days,
        )));
    }
    Ok(Report::with_tasks(filtered))
}

/// Serve the cached snapshot, re-applying the current request's filter.
fn respond_from_snapshot(
    snapshot: Snapshot,
    options: &ReportOptions,
    lookback_days: u32,
) -> Report {
    tracing::debug!(
        scope_id = %snapshot.scope_id,
        saved_at_ms = snapshot.saved_at_ms,
        tasks = snapshot.tasks.len(),
        "serving snapshot"
    );
    let mut filtered = filter_tasks(snapshot.tasks, options);
    sort_newest_first(&mut filtered);
    if filtered.is_empty() {
        return Report::empty(outcome::no_activity_message(options, lookback_days));
    }
    Report::with_tasks(filtered)
}

fn sort_newest_first(tasks: &mut [ProjectedTask]) {
    tasks.sort_by_key(|t| std::cmp::Reverse(t.updated_ms().unwrap_or(i64::MIN)));
}
