//! Core types: raw upstream records, projected tasks, containers, request
//! options, and the aggregated report.
//!
//! Upstream records deserialize leniently: everything beyond an identifier
//! is optional and unknown fields are ignored, so schema drift upstream
//! degrades to missing data instead of a decode failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Nested status object as the upstream sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStatus {
    /// Status label, e.g. `"in progress"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Alternative label some payloads carry instead of `status`.
    #[serde(default)]
    pub name: Option<String>,
}

/// A task member (creator or assignee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Numeric upstream user id.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Member {
    /// Human-oriented identifier: username, then email, then a placeholder.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "(unknown)".to_string())
    }
}

/// A task record as the upstream returns it. Owned transiently by the
/// pipeline; never mutated, only projected.
///
/// Timestamps are epoch milliseconds carried as numeric strings, which is
/// how the upstream serializes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    pub id: String,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub creator: Option<Member>,
    #[serde(default)]
    pub assignees: Vec<Member>,
    #[serde(default)]
    pub custom_fields: Vec<serde_json::Value>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawTask {
    /// Update timestamp parsed to epoch milliseconds, if present and numeric.
    pub fn updated_ms(&self) -> Option<i64> {
        parse_ms(self.date_updated.as_deref())
    }

    /// Flattened status label: the nested `status` field, falling back to
    /// `name`.
    pub fn status_label(&self) -> Option<String> {
        self.status
            .as_ref()
            .and_then(|s| s.status.clone().or_else(|| s.name.clone()))
    }
}

/// A comment record as the upstream returns it (relevant subset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    /// Epoch milliseconds as a numeric string.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user: Option<Member>,
    #[serde(default)]
    pub comment_text: Option<String>,
}

/// An activity-history record as the upstream returns it (relevant subset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    /// Epoch milliseconds as a numeric string.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user: Option<Member>,
    /// Some history payloads carry a bare username instead of a user object.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A folder listing entry with its nested lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderListing {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lists: Vec<ListListing>,
}

/// A bare list entry, nested under a folder or standalone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListListing {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A task container: a list, optionally under exactly one folder.
///
/// Loose containers found via the standalone listing carry no folder tag
/// and are never deduplicated against folder-derived containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
}

/// An enriched comment attached to a projected task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    /// Epoch milliseconds.
    pub timestamp_ms: i64,
    pub author: String,
    pub text: String,
    /// Display timestamp rendered in the request's UTC offset.
    pub posted_at: String,
}

/// An enriched activity entry attached to a projected task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Epoch milliseconds.
    pub timestamp_ms: i64,
    pub author: String,
    pub description: String,
    /// Display timestamp rendered in the request's UTC offset.
    pub occurred_at: String,
}

/// A task reduced to the report field allow-list, plus pipeline-added
/// annotations.
///
/// Every projected field is derived from the raw task; annotations
/// (container tags, enrichment lists, latest-comment summary) are appended
/// by later stages and never replace raw fields. Absent optional fields
/// serialize as omitted, never as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedTask {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    // Pipeline annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activities: Vec<ActivityEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_comment: Option<CommentEntry>,
}

impl ProjectedTask {
    /// Update timestamp parsed to epoch milliseconds, if present and numeric.
    pub fn updated_ms(&self) -> Option<i64> {
        parse_ms(self.date_updated.as_deref())
    }
}

/// Recognized request options: the explicit whitelist of query knobs the
/// pipeline understands. Unrecognized caller parameters never reach the
/// upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Keep only tasks whose custom id starts with this prefix
    /// (case-sensitive, position 0).
    pub custom_id_prefix: Option<String>,
    /// Single target day. Takes precedence over `from`/`to` when both are
    /// given.
    pub day: Option<NaiveDate>,
    /// Range start day. Only effective together with `to`.
    pub from: Option<NaiveDate>,
    /// Range end day (inclusive). Only effective together with `from`.
    pub to: Option<NaiveDate>,
    /// Timezone offset in hours east of UTC used for all day boundaries and
    /// display timestamps.
    pub utc_offset_hours: i32,
    /// Also fetch per-task activity history. Comments are always fetched.
    pub include_activity: bool,
    /// Forwarded to the upstream task listing; closed tasks are part of the
    /// report by default.
    pub include_closed: bool,
    /// Per-request override of [`ReportConfig::lookback_days`](crate::config::ReportConfig).
    pub lookback_days: Option<u32>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            custom_id_prefix: None,
            day: None,
            from: None,
            to: None,
            utc_offset_hours: 0,
            include_activity: false,
            include_closed: true,
            lookback_days: None,
        }
    }
}

/// Summary of the most recently updated task, attached to the
/// nothing-in-lookback message for user orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTask {
    pub id: String,
    pub name: String,
    /// RFC 3339 update timestamp.
    pub updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// The aggregated report returned to the caller.
///
/// An empty `tasks` list is always accompanied by a `message` explaining
/// which stage came up empty; `last_task` is set when tasks exist but none
/// were updated inside the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub tasks: Vec<ProjectedTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_task: Option<LastTask>,
}

impl Report {
    /// A report carrying tasks and no message.
    pub fn with_tasks(tasks: Vec<ProjectedTask>) -> Self {
        Self {
            tasks,
            message: None,
            last_task: None,
        }
    }

    /// An empty report with a descriptive message.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            tasks: Vec::new(),
            message: Some(message.into()),
            last_task: None,
        }
    }
}

/// The cache value: the full pre-filter, projected, enriched task set of
/// the last successful run for a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub scope_id: String,
    /// Epoch milliseconds at which the snapshot was written.
    pub saved_at_ms: i64,
    pub tasks: Vec<ProjectedTask>,
}

fn parse_ms(value: Option<&str>) -> Option<i64> {
    value.and_then(|s| s.parse().ok())
}
