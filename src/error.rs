//! Error types for the Battlefields API client
//!
//! Every failure raised while fetching is funneled through [`BattlefieldsError`].
//! Endpoint methods never return these to callers; they are handed to the
//! configured [`FailureSink`](crate::sink::FailureSink) instead.

use thiserror::Error;

/// Errors that can occur while talking to the Battlefields API
#[derive(Debug, Error)]
pub enum BattlefieldsError {
    /// A query string did not have the `key=value` shape
    #[error("Invalid query: {0}")]
    MalformedQuery(String),

    /// The upstream answered with a non-success status code
    #[error("Failed to connect to '{url}'. {status} {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    /// The response envelope reported `status: false`
    #[error("Failed to connect to Battlefields API: {0}")]
    UpstreamRejected(String),

    /// The payload parsed as JSON but had the wrong structure
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The payload did not match the expected record shape
    #[error("Failed to deserialize response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// HTTP request failed before a status was available
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Work was submitted after the request pool began shutting down
    #[error("Request pool is shut down")]
    PoolShutdown,

    /// Waiting for the request pool to drain was interrupted
    #[error("Shutdown interrupted")]
    Interrupted,
}
