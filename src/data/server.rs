//! Server list, status and info records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BattlefieldsError;

/// Status colour reported for one game server host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub hostname: String,
    /// Status colour such as `green` or `red`
    pub status: String,
}

impl Server {
    /// Whether the upstream reports this host as up
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("green")
    }
}

/// Flattens status entries of the form `{"<hostname>": "<colour>"}`
///
/// # Errors
/// * `MalformedResponse` if an entry is not an object with exactly one key,
///   or its value is not a string
pub fn parse_server_status(entries: Vec<Value>) -> Result<Vec<Server>, BattlefieldsError> {
    entries
        .into_iter()
        .map(|entry| {
            let map = match entry {
                Value::Object(map) => map,
                other => {
                    return Err(BattlefieldsError::MalformedResponse(format!(
                        "Expected a single entry: {}",
                        other
                    )))
                }
            };
            if map.len() != 1 {
                return Err(BattlefieldsError::MalformedResponse(format!(
                    "Expected a single entry: {}",
                    Value::Object(map)
                )));
            }
            match map.into_iter().next() {
                Some((hostname, Value::String(status))) => Ok(Server { hostname, status }),
                Some((hostname, other)) => Err(BattlefieldsError::MalformedResponse(format!(
                    "Expected a status string for '{}', got {}",
                    hostname, other
                ))),
                None => Err(BattlefieldsError::MalformedResponse(
                    "Expected a single entry, got an empty object".to_string(),
                )),
            }
        })
        .collect()
}

/// Player counts reported by a server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPlayers {
    pub online: u32,
    pub max: u32,
    /// Names of online players, when the server publishes them
    #[serde(default)]
    pub list: Vec<String>,
}

/// Live information about a game server
///
/// Deserialized from the server info service's raw shape, where the message
/// of the day is split into lines and most fields are absent for offline
/// servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawServerInfo")]
pub struct ServerInfo {
    pub online: bool,
    pub ip: String,
    pub port: u16,
    pub hostname: Option<String>,
    pub version: Option<String>,
    /// Message of the day as plain text, one line per entry
    pub motd: Vec<String>,
    pub players: ServerPlayers,
}

/// Server info as sent by the upstream
#[derive(Debug, Deserialize)]
struct RawServerInfo {
    #[serde(default)]
    online: bool,
    #[serde(default)]
    ip: String,
    #[serde(default)]
    port: u16,
    hostname: Option<String>,
    version: Option<String>,
    motd: Option<RawMotd>,
    players: Option<ServerPlayers>,
}

#[derive(Debug, Deserialize)]
struct RawMotd {
    #[serde(default)]
    clean: Vec<String>,
}

impl From<RawServerInfo> for ServerInfo {
    fn from(raw: RawServerInfo) -> Self {
        ServerInfo {
            online: raw.online,
            ip: raw.ip,
            port: raw.port,
            hostname: raw.hostname,
            version: raw.version,
            motd: raw
                .motd
                .map(|motd| motd.clean.into_iter().map(|line| line.trim().to_string()).collect())
                .unwrap_or_default(),
            players: raw.players.unwrap_or_default(),
        }
    }
}
