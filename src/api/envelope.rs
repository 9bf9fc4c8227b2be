//! The `{status, detail}` envelope wrapped around table responses

use serde::Deserialize;
use serde_json::Value;

use crate::error::BattlefieldsError;

/// Raw response envelope from the Battlefields API
#[derive(Debug, Deserialize)]
struct Envelope {
    status: bool,
    #[serde(default)]
    detail: Value,
}

/// Extracts the `detail` array from a response envelope
///
/// # Errors
/// * `UpstreamRejected` carrying the upstream message when `status` is false
/// * `MalformedResponse` when `status` is true but `detail` is not an array
/// * `Deserialization` when the document is not an envelope at all
pub fn unwrap_envelope(document: Value) -> Result<Vec<Value>, BattlefieldsError> {
    let envelope: Envelope = serde_json::from_value(document)?;

    if !envelope.status {
        let message = match envelope.detail {
            Value::String(message) => message,
            other => other.to_string(),
        };
        return Err(BattlefieldsError::UpstreamRejected(message));
    }

    match envelope.detail {
        Value::Array(items) => Ok(items),
        other => Err(BattlefieldsError::MalformedResponse(format!(
            "expected detail array, got {}",
            other
        ))),
    }
}
