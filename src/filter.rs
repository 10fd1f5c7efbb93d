//! Time-window filtering across task, comment, and activity timestamps.
//!
//! The window is an inclusive millisecond interval derived from calendar
//! days in the request's UTC offset. Membership is a union: a task counts
//! as inside the window if its own update timestamp, any enriched comment,
//! or any enriched activity entry lands inside it.

use chrono::{NaiveDate, NaiveTime};

use crate::types::{ProjectedTask, ReportOptions};

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;

/// Millisecond UTC timestamp of local midnight for `day` at `offset_hours`
/// east of UTC.
fn local_midnight_ms(day: NaiveDate, offset_hours: i32) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
        - i64::from(offset_hours) * 3_600_000
}

/// Resolve the inclusive `[start, end]` millisecond window, if any.
///
/// A single day takes precedence over the range; a range needs both
/// endpoints, otherwise there is no time filtering.
pub fn resolve_window(options: &ReportOptions) -> Option<(i64, i64)> {
    if let Some(day) = options.day {
        let start = local_midnight_ms(day, options.utc_offset_hours);
        return Some((start, start + DAY_MS - 1));
    }
    match (options.from, options.to) {
        (Some(from), Some(to)) => {
            let start = local_midnight_ms(from, options.utc_offset_hours);
            let end = local_midnight_ms(to, options.utc_offset_hours) + DAY_MS - 1;
            Some((start, end))
        }
        _ => None,
    }
}

/// The day span the enricher filters comments and activities against,
/// derived from the same options as the millisecond window.
pub fn resolve_day_span(options: &ReportOptions) -> Option<(NaiveDate, NaiveDate)> {
    if let Some(day) = options.day {
        return Some((day, day));
    }
    match (options.from, options.to) {
        (Some(from), Some(to)) => Some((from, to)),
        _ => None,
    }
}

fn in_window(ts: i64, window: (i64, i64)) -> bool {
    ts >= window.0 && ts <= window.1
}

/// Union membership: the task's own update timestamp, or any enriched
/// comment or activity timestamp, inside the window.
fn task_in_window(task: &ProjectedTask, window: (i64, i64)) -> bool {
    if task.updated_ms().is_some_and(|ts| in_window(ts, window)) {
        return true;
    }
    task.comments
        .iter()
        .any(|c| in_window(c.timestamp_ms, window))
        || task
            .activities
            .iter()
            .any(|a| in_window(a.timestamp_ms, window))
}

/// Apply the prefix stage and the time-window stage, in that order.
///
/// With a prefix set, tasks without a custom id are dropped. With a window
/// active, a task with no update timestamp survives only through an
/// in-window comment or activity entry.
pub fn filter_tasks(tasks: Vec<ProjectedTask>, options: &ReportOptions) -> Vec<ProjectedTask> {
    let mut kept = tasks;

    if let Some(prefix) = options.custom_id_prefix.as_deref() {
        kept.retain(|t| t.custom_id.as_deref().is_some_and(|id| id.starts_with(prefix)));
    }

    if let Some(window) = resolve_window(options) {
        let before = kept.len();
        kept.retain(|t| task_in_window(t, window));
        tracing::debug!(
            window_start = window.0,
            window_end = window.1,
            before,
            after = kept.len(),
            "time-window filter applied"
        );
    }

    kept
}
