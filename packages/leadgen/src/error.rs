//! Typed errors for the lead generation library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Most of these never
//! reach callers of the qualification or personalization entry points: they
//! are caught per item and turned into degraded results.

use thiserror::Error;

/// Errors raised while fetching a business website.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Headless browser render failed
    #[error("browser render failed: {0}")]
    Browser(String),

    /// Fetch exceeded the configured timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Every fetch strategy failed
    #[error("all fetch strategies failed for {url}: {last}")]
    AllFailed { url: String, last: String },
}

/// Errors from the vision scoring service.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Scorer is not configured (missing key, no browser)
    #[error("scoring service unavailable: {0}")]
    Unavailable(String),

    /// Screenshot could not be captured
    #[error("screenshot failed: {0}")]
    Screenshot(String),

    /// Request to the model failed
    #[error("scoring request failed: {0}")]
    Request(String),

    /// Model answered with something that is not a verdict
    #[error("unparseable scoring response: {0}")]
    Parse(String),

    /// Scoring exceeded the configured timeout
    #[error("scoring timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Errors from the text generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation returned no usable text")]
    Empty,

    #[error("generation timed out")]
    Timeout,
}

/// Errors from the lead tracker store.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Store could not be reached
    #[error("tracker unavailable: {0}")]
    Unavailable(String),

    /// Sheet does not exist
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// Row index out of range
    #[error("row {row} not found in sheet {sheet}")]
    RowNotFound { sheet: String, row: usize },
}

/// Errors from the email transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport not configured: {0}")]
    NotConfigured(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Errors from sending a single outreach email.
#[derive(Debug, Error)]
pub enum OutreachError {
    /// Daily sending limit reached
    #[error("daily limit reached ({limit})")]
    DailyLimitReached { limit: u32 },

    /// Lead has no usable contact address
    #[error("no valid email address for {business}")]
    NoEmail { business: String },

    /// Template could not be parsed
    #[error("invalid email template: {0}")]
    Template(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Top-level error for pipeline operations.
#[derive(Debug, Error)]
pub enum LeadgenError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("AI scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("outreach error: {0}")]
    Outreach(#[from] OutreachError),

    /// Invalid heuristic pattern supplied in configuration
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, LeadgenError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for scoring operations.
pub type ScoringResult<T> = std::result::Result<T, ScoringError>;

/// Result type alias for tracker operations.
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
