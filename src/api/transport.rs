//! One-shot HTTP GET transport
//!
//! The transport issues exactly one request per call with a fixed User-Agent,
//! checks the status code and hands back the body. It holds no state beyond
//! the underlying connection pool, so it can be shared freely between tasks.

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::{header, Client, StatusCode};

use crate::error::BattlefieldsError;

/// Fetches raw resources from the upstream
///
/// Implemented by [`HttpTransport`] for real traffic; tests and embedders can
/// substitute their own implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body at `url` as bytes
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, BattlefieldsError>;

    /// Fetch the body at `url` and parse it as JSON
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, BattlefieldsError> {
        let bytes = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Transport backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    user_agent: String,
}

impl HttpTransport {
    /// Creates a transport that sends `user_agent` on every request
    pub fn new(user_agent: impl Into<String>) -> Result<Self, BattlefieldsError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, user_agent))
    }

    /// Creates a transport using an existing HTTP client
    pub fn with_client(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }

    /// User-Agent sent with every request
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, BattlefieldsError> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        // Dropping the response on error releases the body unread.
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(ReasonPhrase::as_bytes);
        check_status(url, response.status(), reason)?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// Maps a non-success status code to `BattlefieldsError::HttpStatus`
///
/// The message is the reason phrase the server sent, or the standard phrase
/// for the code when the server used that one.
fn check_status(
    url: &str,
    status: StatusCode,
    reason: Option<&[u8]>,
) -> Result<(), BattlefieldsError> {
    if status.is_success() {
        return Ok(());
    }
    let message = match reason {
        Some(reason) => String::from_utf8_lossy(reason).into_owned(),
        None => status.canonical_reason().unwrap_or_default().to_string(),
    };
    Err(BattlefieldsError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
        message,
    })
}
