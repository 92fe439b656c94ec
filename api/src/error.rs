//! API error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the Hypixel and Mojang clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("rate limited: spent {0:?} waiting without the window clearing")]
    RateLimitExhausted(Duration),

    #[error("gave up after {0} attempts")]
    RetriesExhausted(u32),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
