//! Empty-result responses.
//!
//! An empty report always explains itself. Three cases are distinguished:
//! the scope holds no tasks at all, tasks exist but none were updated
//! inside the lookback window (the most recently updated one is named for
//! orientation), or tasks were fetched but none satisfied the fine-grained
//! filter.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::api::UpstreamApi;
use crate::error::Result;
use crate::filter::resolve_day_span;
use crate::types::{Container, LastTask, RawTask, Report, ReportOptions};

/// Message for a scope with no containers or no tasks at all.
pub(crate) fn no_tasks_message(scope_id: &str) -> String {
    format!("No tasks found for scope {scope_id}")
}

/// Message for a fetch that produced tasks, none of which survived the
/// prefix and time-window stages.
pub(crate) fn no_activity_message(options: &ReportOptions, lookback_days: u32) -> String {
    let mut message = match resolve_day_span(options) {
        Some((from, to)) if from == to => format!("No tasks with activity on {from}"),
        Some((from, to)) => format!("No tasks with activity between {from} and {to}"),
        None => format!("No tasks with matching activity in the last {lookback_days} days"),
    };
    if let Some(prefix) = options.custom_id_prefix.as_deref() {
        message.push_str(&format!(" (custom id prefix \"{prefix}\")"));
    }
    message
}

/// RFC 3339 rendering of an epoch-ms timestamp.
fn rfc3339(ts_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Build the response for a windowed fetch that found nothing.
///
/// With containers present, an unwindowed probe locates the most recently
/// updated task so the message can name it; a scope with no tasks at all
/// gets the plain not-found message.
pub(crate) async fn empty_fetch_outcome<A: UpstreamApi>(
    api: &A,
    containers: &[Container],
    scope_id: &str,
    lookback_days: u32,
    options: &ReportOptions,
) -> Result<Report> {
    if containers.is_empty() {
        return Ok(Report::empty(no_tasks_message(scope_id)));
    }

    let mut latest: Option<RawTask> = None;
    for container in containers {
        let raw = api
            .fetch_tasks(&container.id, None, options.include_closed)
            .await?;
        for task in raw {
            if task.updated_ms().is_none() {
                continue;
            }
            if latest
                .as_ref()
                .is_none_or(|current| task.updated_ms() > current.updated_ms())
            {
                latest = Some(task);
            }
        }
    }

    match latest {
        None => Ok(Report::empty(no_tasks_message(scope_id))),
        Some(task) => {
            let updated = rfc3339(task.updated_ms().unwrap_or_default());
            let message = format!(
                "No tasks updated in the last {lookback_days} days. Most recent task: \"{}\" updated {updated}",
                task.name
            );
            let status = task.status_label();
            Ok(Report {
                tasks: Vec::new(),
                message: Some(message),
                last_task: Some(LastTask {
                    id: task.id,
                    name: task.name,
                    updated,
                    status,
                }),
            })
        }
    }
}
