//! Comment and activity enrichment.
//!
//! Each task gets one comment-listing call and, when requested, one
//! history call. A sub-call failure degrades to an empty list for that
//! task only; the batch always completes. The batch fans out through a
//! bounded worker pool so a large task set cannot exhaust upstream rate
//! limits.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use futures::stream::{self, StreamExt};

use crate::api::UpstreamApi;
use crate::config::ReportConfig;
use crate::filter::resolve_day_span;
use crate::types::{ActivityEntry, CommentEntry, Member, ProjectedTask, RawActivity, RawComment, ReportOptions};

/// The request's reference offset as a chrono zone. Out-of-range hours
/// clamp to a representable offset.
pub(crate) fn reference_offset(offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_hours.clamp(-23, 23) * 3600).unwrap_or_else(|| Utc.fix())
}

/// Calendar day of an epoch-ms timestamp, taken AFTER rendering the
/// instant in the reference offset. Reducing the UTC instant directly
/// would put entries near local midnight on the wrong day.
pub(crate) fn local_day(ts_ms: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| dt.with_timezone(&offset).date_naive())
}

/// Display timestamp in the reference offset.
fn display_timestamp(ts_ms: i64, offset: FixedOffset) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| dt.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn within_span(ts_ms: i64, span: Option<(NaiveDate, NaiveDate)>, offset: FixedOffset) -> bool {
    match span {
        None => true,
        Some((from, to)) => local_day(ts_ms, offset).is_some_and(|d| d >= from && d <= to),
    }
}

fn parse_ms(value: Option<&str>) -> Option<i64> {
    value.and_then(|s| s.parse().ok())
}

/// Convert raw comments to enriched entries: newest first, capped at
/// `limit`, then reduced to the day span.
fn comment_entries(
    raw: Vec<RawComment>,
    span: Option<(NaiveDate, NaiveDate)>,
    offset: FixedOffset,
    limit: usize,
) -> Vec<CommentEntry> {
    let mut entries: Vec<CommentEntry> = raw
        .iter()
        .filter_map(|c| {
            let ts = parse_ms(c.date.as_deref())?;
            let text = c
                .comment_text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("(no content)")
                .to_string();
            Some(CommentEntry {
                timestamp_ms: ts,
                author: c
                    .user
                    .as_ref()
                    .map(Member::display_name)
                    .unwrap_or_else(|| "(unknown)".to_string()),
                text,
                posted_at: display_timestamp(ts, offset),
            })
        })
        .collect();

    // Stable sort: equal timestamps keep upstream response order.
    entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp_ms));
    entries.truncate(limit);
    entries.retain(|e| within_span(e.timestamp_ms, span, offset));
    entries
}

/// Convert raw activity records to enriched entries: newest first, reduced
/// to the day span.
fn activity_entries(
    raw: Vec<RawActivity>,
    span: Option<(NaiveDate, NaiveDate)>,
    offset: FixedOffset,
) -> Vec<ActivityEntry> {
    let mut entries: Vec<ActivityEntry> = raw
        .iter()
        .filter_map(|a| {
            let ts = parse_ms(a.date.as_deref())?;
            let author = a
                .user
                .as_ref()
                .map(Member::display_name)
                .or_else(|| a.username.clone())
                .unwrap_or_else(|| "(unknown)".to_string());
            Some(ActivityEntry {
                timestamp_ms: ts,
                author,
                description: a.description.clone().unwrap_or_default(),
                occurred_at: display_timestamp(ts, offset),
            })
        })
        .collect();

    entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp_ms));
    entries.retain(|e| within_span(e.timestamp_ms, span, offset));
    entries
}

/// Enrich one task. Sub-call failures are logged and leave the matching
/// list empty; they never propagate.
async fn enrich_task<A: UpstreamApi>(
    api: &A,
    mut task: ProjectedTask,
    span: Option<(NaiveDate, NaiveDate)>,
    offset: FixedOffset,
    include_activity: bool,
    comment_limit: usize,
) -> ProjectedTask {
    match api.fetch_comments(&task.id).await {
        Ok(raw) => {
            task.comments = comment_entries(raw, span, offset, comment_limit);
        }
        Err(err) => {
            tracing::warn!(task_id = %task.id, error = %err, "comment fetch failed, continuing without");
        }
    }

    if include_activity {
        match api.fetch_history(&task.id).await {
            Ok(raw) => {
                task.activities = activity_entries(raw, span, offset);
            }
            Err(err) => {
                tracing::warn!(task_id = %task.id, error = %err, "history fetch failed, continuing without");
            }
        }
    }

    task.latest_comment = task.comments.first().cloned();
    task
}

/// Enrich a batch of tasks through a bounded worker pool.
///
/// Completion order is irrelevant: each task owns its own enrichment
/// result and the orchestrator re-sorts the batch afterwards.
pub async fn enrich_tasks<A: UpstreamApi>(
    api: &A,
    tasks: Vec<ProjectedTask>,
    options: &ReportOptions,
    config: &ReportConfig,
) -> Vec<ProjectedTask> {
    let span = resolve_day_span(options);
    let offset = reference_offset(options.utc_offset_hours);
    let width = config.enrich_concurrency.max(1);
    let total = tasks.len();

    let enriched: Vec<ProjectedTask> = stream::iter(tasks)
        .map(|task| {
            enrich_task(
                api,
                task,
                span,
                offset,
                options.include_activity,
                config.comment_limit,
            )
        })
        .buffer_unordered(width)
        .collect()
        .await;

    tracing::debug!(total, width, "enrichment complete");
    enriched
}
