//! Best-effort snapshot store: one JSON file per scope id.
//!
//! The store is a fallback source, not a database. Writes happen whole on
//! every successful run and are swallowed on failure; unreadable or
//! missing snapshots read as absent. Concurrent writers for the same
//! scope race last-writer-wins.

use std::path::PathBuf;

use crate::error::{ReportError, Result};
use crate::types::Snapshot;

/// Snapshot root directory: `CLICKUP_REPORT_CACHE_DIR` when set, otherwise
/// the platform cache directory.
#[must_use]
pub fn cache_root() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("CLICKUP_REPORT_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::cache_dir()
        .map(|d| d.join("clickup-report"))
        .unwrap_or_else(|| PathBuf::from("/tmp/clickup-report-cache"))
}

/// Per-scope snapshot persistence.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// A store rooted at `root`, or at [`cache_root`] when `None`.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.unwrap_or_else(cache_root),
        }
    }

    /// Snapshot file for a scope. Identity derives from the scope id alone;
    /// characters outside `[A-Za-z0-9_-]` are replaced so an arbitrary id
    /// cannot escape the root.
    pub fn snapshot_path(&self, scope_id: &str) -> PathBuf {
        let safe: String = scope_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("scope-{safe}.json"))
    }

    /// Last snapshot for a scope. Any read or decode failure reads as
    /// absent.
    pub async fn read(&self, scope_id: &str) -> Option<Snapshot> {
        let path = self.snapshot_path(scope_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no snapshot to read");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "snapshot unreadable, treating as absent");
                None
            }
        }
    }

    /// Persist a snapshot, overwriting any previous one for the scope.
    /// Failures are logged and swallowed; caching never fails the primary
    /// response path.
    pub async fn write(&self, snapshot: &Snapshot) {
        if let Err(err) = self.try_write(snapshot).await {
            tracing::warn!(scope_id = %snapshot.scope_id, error = %err, "snapshot write failed");
        }
    }

    async fn try_write(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.scope_id);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ReportError::Cache(e.to_string()))?;
        let body =
            serde_json::to_vec_pretty(snapshot).map_err(|e| ReportError::Cache(e.to_string()))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| ReportError::Cache(e.to_string()))?;
        tracing::debug!(path = %path.display(), tasks = snapshot.tasks.len(), "snapshot written");
        Ok(())
    }
}
