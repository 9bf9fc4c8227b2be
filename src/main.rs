//! bfstats - query the Battlefields statistics API from the command line
//!
//! Fetches one endpoint through the cached client and prints the result as
//! pretty JSON on stdout. Logs go to stderr and are filtered with `RUST_LOG`.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use battlefields::api::BattlefieldsClient;
use battlefields::cli::{Cli, Endpoint, Invocation};
use battlefields::data::ServerInfo;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Runs the requested endpoint and renders its result
async fn run(client: &BattlefieldsClient, invocation: &Invocation) -> Result<String, Box<dyn Error>> {
    let queries = &invocation.queries;
    let json = match invocation.endpoint {
        Endpoint::Kills => to_json(&*client.kills(queries).await)?,
        Endpoint::Wins => to_json(&*client.wins(queries).await)?,
        Endpoint::Players => to_json(&*client.players(queries).await)?,
        Endpoint::Matches => to_json(&*client.matches(queries).await)?,
        Endpoint::MatchParticipants => to_json(&*client.match_participants(queries).await)?,
        Endpoint::MatchKills => to_json(&*client.match_kills(queries).await)?,
        Endpoint::Accessories => to_json(&*client.accessories(queries).await)?,
        Endpoint::AccessoryTypes => to_json(&*client.accessory_types(queries).await)?,
        Endpoint::OwnedAccessories => to_json(&*client.owned_accessories(queries).await)?,
        Endpoint::Weapons => to_json(&*client.weapons(queries).await)?,
        Endpoint::WeaponStats => to_json(&*client.weapon_stats(queries).await)?,
        Endpoint::Emotes => to_json(&*client.emotes(queries).await)?,
        Endpoint::OwnedEmotes => to_json(&*client.owned_emotes(queries).await)?,
        Endpoint::LinkedDiscord => to_json(&*client.linked_discord(queries).await)?,
        Endpoint::Table => match invocation.table {
            Some(table) => to_json(&client.get(table, queries).await.as_deref())?,
            None => to_json(&())?,
        },
        Endpoint::ServerList => to_json(&*client.server_list().await)?,
        Endpoint::ServerStatus => to_json(&*client.server_status().await)?,
        Endpoint::ServerInfo => {
            // Lookups are independent, so run them side by side on the pool.
            let pool = client.pool().clone();
            let mut handles = Vec::with_capacity(invocation.addresses.len());
            for address in &invocation.addresses {
                let client = client.clone();
                let address = address.clone();
                handles.push(pool.spawn(async move { client.server_info(&address).await })?);
            }

            let mut infos: Vec<Option<ServerInfo>> = Vec::with_capacity(handles.len());
            for result in futures::future::join_all(handles).await {
                infos.push(result?.as_deref().cloned());
            }
            to_json(&infos)?
        }
    };
    Ok(json)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match try_main(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

async fn try_main(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let invocation = Invocation::from_cli(cli)?;
    let client = BattlefieldsClient::new(cli.client_config())?;

    let output = run(&client, &invocation).await?;
    println!("{}", output);

    if !client.shutdown().await? {
        tracing::warn!("requests still running after shutdown wait");
    }

    Ok(())
}
