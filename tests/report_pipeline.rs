//! End-to-end pipeline tests over a scripted upstream API.
//!
//! These exercise the orchestrator through the public `report_with` entry:
//! the empty-result scenarios, prefix and day-window filtering, union
//! membership, and the snapshot fallback policy.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone, Utc};

use clickup_report::cache::SnapshotStore;
use clickup_report::error::{ReportError, Result};
use clickup_report::types::{
    FolderListing, ListListing, RawActivity, RawComment, RawTask, ReportOptions,
};
use clickup_report::{report_with, ReportConfig, UpstreamApi};

// ────────────────────────────────────────────────────────────────────────────
// Scripted upstream
// ────────────────────────────────────────────────────────────────────────────

/// How the scripted upstream answers listing calls.
#[derive(Clone, Copy)]
enum Mode {
    Ok,
    ConnectFailure,
    Rejected(u16),
}

struct ScriptedApi {
    mode: Mode,
    folders: Vec<FolderListing>,
    lists: Vec<ListListing>,
    tasks_by_list: HashMap<String, Vec<RawTask>>,
    comments: HashMap<String, Vec<RawComment>>,
    history: HashMap<String, Vec<RawActivity>>,
}

impl ScriptedApi {
    fn new() -> Self {
        Self {
            mode: Mode::Ok,
            folders: vec![],
            lists: vec![],
            tasks_by_list: HashMap::new(),
            comments: HashMap::new(),
            history: HashMap::new(),
        }
    }

    fn check_mode(&self) -> Result<()> {
        match self.mode {
            Mode::Ok => Ok(()),
            Mode::ConnectFailure => Err(ReportError::Connect("connection refused".into())),
            Mode::Rejected(status) => Err(ReportError::UpstreamStatus { status }),
        }
    }
}

impl UpstreamApi for ScriptedApi {
    async fn fetch_folders(&self, _scope_id: &str) -> Result<Vec<FolderListing>> {
        self.check_mode()?;
        Ok(self.folders.clone())
    }

    async fn fetch_lists(&self, _scope_id: &str) -> Result<Vec<ListListing>> {
        self.check_mode()?;
        Ok(self.lists.clone())
    }

    async fn fetch_tasks(
        &self,
        list_id: &str,
        updated_after_ms: Option<i64>,
        _include_closed: bool,
    ) -> Result<Vec<RawTask>> {
        self.check_mode()?;
        let tasks = self.tasks_by_list.get(list_id).cloned().unwrap_or_default();
        Ok(match updated_after_ms {
            None => tasks,
            Some(cutoff) => tasks
                .into_iter()
                .filter(|t| t.updated_ms().is_some_and(|ts| ts > cutoff))
                .collect(),
        })
    }

    async fn fetch_comments(&self, task_id: &str) -> Result<Vec<RawComment>> {
        Ok(self.comments.get(task_id).cloned().unwrap_or_default())
    }

    async fn fetch_history(&self, task_id: &str) -> Result<Vec<RawActivity>> {
        Ok(self.history.get(task_id).cloned().unwrap_or_default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

fn task(id: &str, custom_id: Option<&str>, name: &str, updated_ms: i64) -> RawTask {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "custom_id": custom_id,
        "name": name,
        "status": {"status": "in progress"},
        "date_updated": updated_ms.to_string(),
    }))
    .expect("task fixture")
}

fn comment(ts_ms: i64, author: &str, text: &str) -> RawComment {
    serde_json::from_value(serde_json::json!({
        "date": ts_ms.to_string(),
        "user": {"username": author},
        "comment_text": text,
    }))
    .expect("comment fixture")
}

fn single_list_api(tasks: Vec<RawTask>) -> ScriptedApi {
    let mut api = ScriptedApi::new();
    api.lists = vec![ListListing {
        id: "l1".into(),
        name: "Sprint".into(),
    }];
    api.tasks_by_list.insert("l1".into(), tasks);
    api
}

fn store() -> (tempfile::TempDir, SnapshotStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_store = SnapshotStore::new(Some(dir.path().to_path_buf()));
    (dir, snapshot_store)
}

fn ms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, min, s)
        .single()
        .expect("valid timestamp")
        .timestamp_millis()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Options with a lookback long enough to reach fixed historical fixtures.
fn deep_lookback() -> ReportOptions {
    ReportOptions {
        lookback_days: Some(10_000),
        ..Default::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Empty-result scenarios
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_scope_without_containers() {
    let api = ScriptedApi::new();
    let (_dir, snapshots) = store();

    let report = report_with(
        &api,
        &snapshots,
        "space-1",
        &ReportOptions::default(),
        &ReportConfig::default(),
    )
    .await
    .expect("report");

    assert!(report.tasks.is_empty());
    assert_eq!(
        report.message.as_deref(),
        Some("No tasks found for scope space-1")
    );
    assert!(report.last_task.is_none());
}

#[tokio::test]
async fn scenario_a_containers_without_tasks() {
    let api = single_list_api(vec![]);
    let (_dir, snapshots) = store();

    let report = report_with(
        &api,
        &snapshots,
        "space-1",
        &ReportOptions::default(),
        &ReportConfig::default(),
    )
    .await
    .expect("report");

    assert!(report.tasks.is_empty());
    assert_eq!(
        report.message.as_deref(),
        Some("No tasks found for scope space-1")
    );
}

#[tokio::test]
async fn scenario_b_stale_tasks_name_most_recent() {
    let thirty_days_ago = Utc::now().timestamp_millis() - 30 * 86_400_000;
    let older = thirty_days_ago - 86_400_000;
    let api = single_list_api(vec![
        task("t-old", None, "Older task", older),
        task("t-recent", None, "Quarterly cleanup", thirty_days_ago),
    ]);
    let (_dir, snapshots) = store();

    let report = report_with(
        &api,
        &snapshots,
        "space-1",
        &ReportOptions::default(),
        &ReportConfig::default(),
    )
    .await
    .expect("report");

    assert!(report.tasks.is_empty());
    let message = report.message.expect("message");
    assert!(message.contains("No tasks updated in the last 8 days"), "{message}");
    assert!(message.contains("Quarterly cleanup"), "{message}");

    let last = report.last_task.expect("last task");
    assert_eq!(last.id, "t-recent");
    assert_eq!(last.name, "Quarterly cleanup");
    assert_eq!(last.status.as_deref(), Some("in progress"));
    assert!(!last.updated.is_empty());
}

#[tokio::test]
async fn scenario_filtered_to_nothing_names_the_window() {
    let api = single_list_api(vec![task(
        "t1",
        None,
        "May task",
        ms(2025, 5, 20, 12, 0, 0),
    )]);
    let (_dir, snapshots) = store();

    let options = ReportOptions {
        day: Some(date(2025, 5, 29)),
        ..deep_lookback()
    };
    let report = report_with(&api, &snapshots, "space-1", &options, &ReportConfig::default())
        .await
        .expect("report");

    assert!(report.tasks.is_empty());
    assert_eq!(
        report.message.as_deref(),
        Some("No tasks with activity on 2025-05-29")
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Filtering
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_c_prefix_filters_custom_ids() {
    let now = Utc::now().timestamp_millis();
    let api = single_list_api(vec![
        task("t1", Some("ENG-1"), "Engine work", now - 3_600_000),
        task("t2", Some("OPS-2"), "Ops work", now - 3_600_000),
    ]);
    let (_dir, snapshots) = store();

    let options = ReportOptions {
        custom_id_prefix: Some("ENG-".into()),
        ..Default::default()
    };
    let report = report_with(&api, &snapshots, "space-1", &options, &ReportConfig::default())
        .await
        .expect("report");

    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.tasks[0].custom_id.as_deref(), Some("ENG-1"));
}

#[tokio::test]
async fn scenario_d_offset_day_boundaries() {
    // Day 2025-05-29 at UTC+2 covers [2025-05-28T22:00Z, 2025-05-29T22:00Z).
    let api = single_list_api(vec![
        task("t-in", None, "Late local evening", ms(2025, 5, 29, 21, 30, 0)),
        task("t-out", None, "Next local day", ms(2025, 5, 29, 22, 30, 0)),
    ]);
    let (_dir, snapshots) = store();

    let options = ReportOptions {
        day: Some(date(2025, 5, 29)),
        utc_offset_hours: 2,
        ..deep_lookback()
    };
    let report = report_with(&api, &snapshots, "space-1", &options, &ReportConfig::default())
        .await
        .expect("report");

    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.tasks[0].id, "t-in");
}

#[tokio::test]
async fn union_in_window_comment_rescues_stale_task() {
    let mut api = single_list_api(vec![task(
        "t1",
        None,
        "Stale but discussed",
        ms(2025, 4, 1, 12, 0, 0),
    )]);
    api.comments.insert(
        "t1".into(),
        vec![comment(ms(2025, 5, 29, 9, 0, 0), "ada", "still relevant?")],
    );
    let (_dir, snapshots) = store();

    let options = ReportOptions {
        day: Some(date(2025, 5, 29)),
        ..deep_lookback()
    };
    let report = report_with(&api, &snapshots, "space-1", &options, &ReportConfig::default())
        .await
        .expect("report");

    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.tasks[0].id, "t1");
    assert_eq!(report.tasks[0].comments.len(), 1);
    let latest = report.tasks[0].latest_comment.as_ref().expect("latest");
    assert_eq!(latest.author, "ada");
}

// ────────────────────────────────────────────────────────────────────────────
// Annotations and ordering
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tasks_tagged_with_container_and_folder() {
    let now = Utc::now().timestamp_millis();
    let mut api = ScriptedApi::new();
    api.folders = vec![FolderListing {
        id: "f1".into(),
        name: "Backend".into(),
        lists: vec![ListListing {
            id: "l1".into(),
            name: "Sprint".into(),
        }],
    }];
    api.tasks_by_list
        .insert("l1".into(), vec![task("t1", None, "A", now - 1_000)]);
    let (_dir, snapshots) = store();

    let report = report_with(
        &api,
        &snapshots,
        "space-1",
        &ReportOptions::default(),
        &ReportConfig::default(),
    )
    .await
    .expect("report");

    let t = &report.tasks[0];
    assert_eq!(t.list_id.as_deref(), Some("l1"));
    assert_eq!(t.list_name.as_deref(), Some("Sprint"));
    assert_eq!(t.folder_id.as_deref(), Some("f1"));
    assert_eq!(t.folder_name.as_deref(), Some("Backend"));
}

#[tokio::test]
async fn response_ordered_most_recent_first() {
    let now = Utc::now().timestamp_millis();
    let api = single_list_api(vec![
        task("t-old", None, "Old", now - 3_600_000),
        task("t-new", None, "New", now - 60_000),
        task("t-mid", None, "Mid", now - 1_800_000),
    ]);
    let (_dir, snapshots) = store();

    let report = report_with(
        &api,
        &snapshots,
        "space-1",
        &ReportOptions::default(),
        &ReportConfig::default(),
    )
    .await
    .expect("report");

    let ids: Vec<&str> = report.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t-new", "t-mid", "t-old"]);
}

// ────────────────────────────────────────────────────────────────────────────
// Snapshot fallback
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fallback_serves_cached_snapshot_when_upstream_unreachable() {
    let now = Utc::now().timestamp_millis();
    let mut api = single_list_api(vec![task("t1", None, "Cached task", now - 1_000)]);
    let (_dir, snapshots) = store();
    let config = ReportConfig::default();
    let options = ReportOptions::default();

    let live = report_with(&api, &snapshots, "space-1", &options, &config)
        .await
        .expect("live report");
    assert_eq!(live.tasks.len(), 1);

    api.mode = Mode::ConnectFailure;
    let fallback = report_with(&api, &snapshots, "space-1", &options, &config)
        .await
        .expect("fallback report");

    assert_eq!(fallback.tasks, live.tasks);
    assert!(fallback.message.is_none());
}

#[tokio::test]
async fn fallback_reapplies_current_filter_to_snapshot() {
    let mut api = single_list_api(vec![
        task("t-may", Some("ENG-1"), "May work", ms(2025, 5, 29, 10, 0, 0)),
        task("t-june", Some("OPS-9"), "June work", ms(2025, 6, 10, 10, 0, 0)),
    ]);
    let (_dir, snapshots) = store();
    let config = ReportConfig::default();

    report_with(&api, &snapshots, "space-1", &deep_lookback(), &config)
        .await
        .expect("prime the snapshot");

    api.mode = Mode::ConnectFailure;
    let options = ReportOptions {
        day: Some(date(2025, 5, 29)),
        ..deep_lookback()
    };
    let fallback = report_with(&api, &snapshots, "space-1", &options, &config)
        .await
        .expect("fallback report");

    assert_eq!(fallback.tasks.len(), 1);
    assert_eq!(fallback.tasks[0].id, "t-may");
}

#[tokio::test]
async fn connect_error_without_snapshot_surfaces() {
    let mut api = ScriptedApi::new();
    api.mode = Mode::ConnectFailure;
    let (_dir, snapshots) = store();

    let result = report_with(
        &api,
        &snapshots,
        "space-1",
        &ReportOptions::default(),
        &ReportConfig::default(),
    )
    .await;

    match result {
        Err(ReportError::Connect(message)) => assert!(message.contains("connection refused")),
        other => panic!("expected connect error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_response_never_falls_back_to_snapshot() {
    let now = Utc::now().timestamp_millis();
    let mut api = single_list_api(vec![task("t1", None, "Cached task", now - 1_000)]);
    let (_dir, snapshots) = store();
    let config = ReportConfig::default();

    report_with(&api, &snapshots, "space-1", &ReportOptions::default(), &config)
        .await
        .expect("prime the snapshot");

    api.mode = Mode::Rejected(401);
    let result = report_with(&api, &snapshots, "space-1", &ReportOptions::default(), &config).await;

    assert!(matches!(
        result,
        Err(ReportError::UpstreamStatus { status: 401 })
    ));
}

#[tokio::test]
async fn snapshot_stores_prefilter_enriched_set() {
    let api = single_list_api(vec![
        task("t-may", None, "May work", ms(2025, 5, 29, 10, 0, 0)),
        task("t-june", None, "June work", ms(2025, 6, 10, 10, 0, 0)),
    ]);
    let (_dir, snapshots) = store();

    let options = ReportOptions {
        day: Some(date(2025, 5, 29)),
        ..deep_lookback()
    };
    let report = report_with(&api, &snapshots, "space-1", &options, &ReportConfig::default())
        .await
        .expect("report");
    assert_eq!(report.tasks.len(), 1, "filter keeps only the May task");

    let snapshot = snapshots.read("space-1").await.expect("snapshot written");
    assert_eq!(snapshot.scope_id, "space-1");
    assert_eq!(snapshot.tasks.len(), 2, "snapshot keeps the pre-filter set");
}
