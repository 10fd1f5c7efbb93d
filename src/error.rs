//! Error types for the report pipeline.
//!
//! All errors carry stable string messages suitable for display and for
//! structured error bodies. Credentials never appear in error messages.

/// Errors that can occur while building a task report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Caller-supplied input was missing or malformed. Surfaced before any
    /// upstream call is attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The upstream API could not be reached (DNS failure, refused
    /// connection, timeout). The only error class that triggers the
    /// snapshot fallback.
    #[error("upstream connect error: {0}")]
    Connect(String),

    /// The upstream API answered with a non-success status. Propagated
    /// directly rather than masked by the cache: a 4xx is a caller mistake
    /// the cache cannot fix.
    #[error("upstream returned HTTP {status}")]
    UpstreamStatus {
        /// HTTP status code of the rejected response.
        status: u16,
    },

    /// The upstream response body was not the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid report configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Snapshot store failure. Absorbed inside the store (writes are logged
    /// and swallowed, unreadable snapshots read as absent), never escalated
    /// out of the pipeline.
    #[error("cache error: {0}")]
    Cache(String),
}

/// Convenience type alias for report results.
pub type Result<T> = std::result::Result<T, ReportError>;
