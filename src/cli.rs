//! Command-line interface parsing for bfstats
//!
//! This module maps clap arguments onto a [`ClientConfig`] and validates the
//! endpoint-specific arguments before any request is made.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::api::{ClientConfig, Table};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A `--query` value is not of the form `key=value`
    #[error("Invalid query: '{0}'. Queries must look like key=value")]
    InvalidQuery(String),

    /// The `table` endpoint was used without `--table`
    #[error("The table endpoint needs --table <NAME>")]
    MissingTable,

    /// The table name is not one the API knows
    #[error("Invalid table: '{0}'")]
    InvalidTable(String),

    /// The `server-info` endpoint was used without `--ip`
    #[error("The server-info endpoint needs at least one --ip <ADDRESS>")]
    MissingAddress,
}

/// Endpoints reachable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Endpoint {
    Kills,
    Wins,
    Players,
    Matches,
    MatchParticipants,
    MatchKills,
    Accessories,
    AccessoryTypes,
    OwnedAccessories,
    Weapons,
    WeaponStats,
    Emotes,
    OwnedEmotes,
    LinkedDiscord,
    /// Raw records from the table named by --table
    Table,
    ServerList,
    ServerStatus,
    ServerInfo,
}

/// bfstats - query the Battlefields statistics API
#[derive(Parser, Debug)]
#[command(name = "bfstats")]
#[command(about = "Query the Battlefields statistics API and print the result as JSON")]
#[command(version)]
pub struct Cli {
    /// Endpoint to query
    #[arg(value_enum)]
    pub endpoint: Endpoint,

    /// Filter in key=value form, may be repeated
    ///
    /// Examples:
    ///   bfstats kills -q uuid=069a79f4-44e9-4726-a5be-fca90e38aaf5
    ///   bfstats matches -q map=desert -q limit=10
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
    pub queries: Vec<String>,

    /// Table name for the `table` endpoint (e.g. kills, owned_emotes)
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Server address for `server-info`, may be repeated
    #[arg(long = "ip", value_name = "ADDRESS")]
    pub addresses: Vec<String>,

    /// Base URL of the table API
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Cache lifetime in seconds, 0 disables caching
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub cache_ttl: u64,

    /// Retry failed requests immediately instead of waiting one cache lifetime
    #[arg(long)]
    pub no_cache_errors: bool,

    /// Seconds to wait for running requests on exit
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub shutdown_wait: u64,
}

impl Cli {
    /// Client configuration derived from the flags
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            cache_ttl: Duration::from_secs(self.cache_ttl),
            cache_errors: !self.no_cache_errors,
            shutdown_wait: Duration::from_secs(self.shutdown_wait),
            ..Default::default()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        config
    }
}

/// A validated request ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub endpoint: Endpoint,
    /// Target of the `table` endpoint
    pub table: Option<Table>,
    pub queries: Vec<String>,
    pub addresses: Vec<String>,
}

impl Invocation {
    /// Validates parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Invocation)` when the arguments fit the chosen endpoint
    /// * `Err(CliError)` describing the first problem found
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if let Some(bad) = cli.queries.iter().find(|q| !q.contains('=')) {
            return Err(CliError::InvalidQuery(bad.clone()));
        }

        let table = match (cli.endpoint, &cli.table) {
            (Endpoint::Table, None) => return Err(CliError::MissingTable),
            (Endpoint::Table, Some(name)) => {
                Some(Table::from_name(name).ok_or_else(|| CliError::InvalidTable(name.clone()))?)
            }
            _ => None,
        };

        if cli.endpoint == Endpoint::ServerInfo && cli.addresses.is_empty() {
            return Err(CliError::MissingAddress);
        }

        Ok(Invocation {
            endpoint: cli.endpoint,
            table,
            queries: cli.queries.clone(),
            addresses: cli.addresses.clone(),
        })
    }
}
