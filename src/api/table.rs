//! Tables exposed through the `?type=` parameter of the Battlefields API

use std::fmt;

/// An upstream table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Kills,
    Wins,
    Players,
    Matches,
    OwnedAccessories,
    Accessories,
    AccessoryTypes,
    Weapons,
    WeaponStats,
    MatchParticipants,
    MatchKills,
    OwnedEmotes,
    Emotes,
    LinkedDiscord,
}

impl Table {
    /// Every table, in upstream documentation order
    pub const ALL: [Table; 14] = [
        Table::Kills,
        Table::Wins,
        Table::Players,
        Table::Matches,
        Table::OwnedAccessories,
        Table::Accessories,
        Table::AccessoryTypes,
        Table::Weapons,
        Table::WeaponStats,
        Table::MatchParticipants,
        Table::MatchKills,
        Table::OwnedEmotes,
        Table::Emotes,
        Table::LinkedDiscord,
    ];

    /// Name used on the wire and in cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Kills => "kills",
            Table::Wins => "wins",
            Table::Players => "players",
            Table::Matches => "matches",
            Table::OwnedAccessories => "owned_accessories",
            Table::Accessories => "accessories",
            Table::AccessoryTypes => "accessory_types",
            Table::Weapons => "weapons",
            Table::WeaponStats => "weapon_stats",
            Table::MatchParticipants => "match_participants",
            Table::MatchKills => "match_kills",
            Table::OwnedEmotes => "owned_emotes",
            Table::Emotes => "emotes",
            Table::LinkedDiscord => "linked_discord",
        }
    }

    /// Looks up a table by its wire name
    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|table| table.as_str() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
