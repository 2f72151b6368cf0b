//! Error taxonomy for the extraction pipeline.
//!
//! Section-level problems (a missing container, a field that never renders)
//! are not errors: parsers swallow them and return `None` so the aggregate
//! record stays best-effort. The variants here cover the failures that must
//! stay distinguishable to callers - bot challenges must not be retried,
//! confirmed-unavailable data must not be treated as a timeout, and a missing
//! clearance credential needs an operator, not a retry loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(
        "Chrome/Chromium not found. Install it (e.g. apt install chromium-browser) \
         or point --remote-url at a running instance"
    )]
    ChromeNotFound,

    #[error("Failed to start browser: {0}")]
    Launch(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("CF_CLEARANCE is not set; will not fetch chart data unauthenticated")]
    ClearanceMissing,

    #[error("Bot challenge page served for {url}")]
    AntiBotChallenge { url: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Session ID not found for section {section}")]
    SessionIdMissing { section: String },

    #[error("Chart {chart} did not load within the attempt budget")]
    ChartTimedOut { chart: String },

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
