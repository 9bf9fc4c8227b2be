//! Record types returned by the Battlefields API
//!
//! These are plain attribute bags deserialized from the `detail` array of a
//! table response. Field names follow the upstream's camelCase JSON keys.

pub mod server;

pub use server::{parse_server_status, Server, ServerInfo, ServerPlayers};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kill count for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kill {
    /// Player UUID
    pub uuid: String,
    /// Number of kills
    pub kills: u32,
}

/// Win count for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    /// Player UUID
    pub uuid: String,
    /// Number of wins
    pub wins: u32,
}

/// A player known to the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub uuid: String,
    pub username: String,
}

/// A played match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u64,
    #[serde(default)]
    pub map: String,
    /// When the match started
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    /// When the match ended, if it has
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub end_time: Option<DateTime<Utc>>,
}

/// A player's participation in a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipant {
    pub match_id: u64,
    pub uuid: String,
    #[serde(default)]
    pub team: String,
}

/// A single kill recorded during a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillInfo {
    pub match_id: u64,
    /// UUID of the killing player
    pub killer: String,
    /// UUID of the killed player
    pub victim: String,
    #[serde(default)]
    pub weapon: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
}

/// A cosmetic accessory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessory {
    pub id: u32,
    pub name: String,
    /// Id of the [`AccessoryType`] this accessory belongs to
    pub type_id: u32,
}

/// A category of accessories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryType {
    pub id: u32,
    pub name: String,
}

/// An accessory owned by a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedAccessory {
    pub uuid: String,
    pub accessory_id: u32,
}

/// A weapon available in game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Per-player statistics for one weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponStats {
    pub uuid: String,
    pub weapon_id: u32,
    #[serde(default)]
    pub kills: u32,
}

/// An emote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emote {
    pub id: u32,
    pub name: String,
}

/// An emote owned by a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedEmote {
    pub uuid: String,
    pub emote_id: u32,
}

/// Link between a player and a Discord account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedDiscord {
    pub uuid: String,
    pub discord_id: String,
}
