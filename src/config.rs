//! Report configuration with sensible defaults.
//!
//! [`ReportConfig`] is resolved by the caller and passed into the entry
//! point explicitly. The pipeline never reads ambient process state at call
//! time; the only environment consultation is the optional cache-dir
//! override inside [`crate::cache`].

use std::path::PathBuf;

use crate::error::ReportError;

/// Configuration for a report run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Base URL of the upstream API, without a trailing slash.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Default trailing period, in days, bounding the initial upstream task
    /// query. Overridable per request via
    /// [`ReportOptions::lookback_days`](crate::types::ReportOptions).
    pub lookback_days: u32,
    /// Width of the bounded worker pool used for per-task enrichment.
    pub enrich_concurrency: usize,
    /// Maximum number of comments kept per task after the newest-first sort.
    pub comment_limit: usize,
    /// Character budget for the two free-text task fields; longer values are
    /// truncated with an ellipsis marker.
    pub text_budget: usize,
    /// Snapshot directory override. `None` resolves the platform cache
    /// directory (see [`crate::cache::cache_root`]).
    pub cache_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.clickup.com/api/v2".to_string(),
            timeout_seconds: 30,
            lookback_days: 8,
            enrich_concurrency: 8,
            comment_limit: 25,
            text_budget: 500,
            cache_dir: None,
        }
    }
}

impl ReportConfig {
    /// Validates this configuration, returning an error if any field is
    /// invalid.
    ///
    /// Checks:
    /// - `base_url` must not be empty
    /// - `timeout_seconds` must be greater than 0
    /// - `lookback_days` must be greater than 0
    /// - `enrich_concurrency` must be greater than 0
    /// - `text_budget` must be greater than 0
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.base_url.trim().is_empty() {
            return Err(ReportError::Config("base_url must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(ReportError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.lookback_days == 0 {
            return Err(ReportError::Config(
                "lookback_days must be greater than 0".into(),
            ));
        }
        if self.enrich_concurrency == 0 {
            return Err(ReportError::Config(
                "enrich_concurrency must be greater than 0".into(),
            ));
        }
        if self.text_budget == 0 {
            return Err(ReportError::Config(
                "text_budget must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
