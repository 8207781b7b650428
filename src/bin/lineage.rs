//! Atlan Lineage CLI
//!
//! Walks lineage from an asset and deletes assets, optionally waiting for the
//! deletion to settle.

use std::path::PathBuf;

use anyhow::{Context, Result};
use atlan_sdk::{
    AssetMutator, AtlanClient, AtlanConfig, DeleteType, LineageDirection, LineageRequest,
    LineageResponse,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atlan-lineage")]
#[command(about = "Traverse lineage and manage assets on an Atlan tenant")]
struct Cli {
    /// Config file (defaults to atlan.toml lookup)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// One GUID per line
    Guids,
    /// type, GUID and qualified name per asset
    Assets,
    /// GraphViz DOT of the whole response
    Dot,
}

#[derive(Subcommand)]
enum Commands {
    /// Assets downstream of an asset
    Downstream {
        guid: String,
        /// Hops to request
        #[arg(short, long)]
        depth: Option<u32>,
        /// Only immediate neighbours
        #[arg(long)]
        immediate: bool,
        #[arg(short, long, value_enum, default_value = "guids")]
        format: Format,
    },

    /// Assets upstream of an asset
    Upstream {
        guid: String,
        #[arg(short, long)]
        depth: Option<u32>,
        #[arg(long)]
        immediate: bool,
        #[arg(short, long, value_enum, default_value = "guids")]
        format: Format,
    },

    /// Delete assets by GUID
    Delete {
        #[arg(required = true)]
        guids: Vec<String>,
        /// Purge instead of archiving
        #[arg(long)]
        purge: bool,
        /// Wait until the deletion is confirmed
        #[arg(long)]
        block: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_ref().and_then(|p| p.to_str());
    let config = AtlanConfig::load_from(config_path).context("Failed to load configuration")?;
    let client = AtlanClient::new(&config)?;

    match cli.command {
        Commands::Downstream { guid, depth, immediate, format } => {
            let response = fetch(&client, &config, &guid, depth, LineageDirection::Output)?;
            let guids = if immediate {
                response.downstream_guids()?.into_iter().map(String::from).collect()
            } else {
                response.all_downstream_guids_dfs()?
            };
            print_result(&response, &guids, format)
        }

        Commands::Upstream { guid, depth, immediate, format } => {
            let response = fetch(&client, &config, &guid, depth, LineageDirection::Input)?;
            let guids = if immediate {
                response.upstream_guids()?.into_iter().map(String::from).collect()
            } else {
                response.all_upstream_guids_dfs()?
            };
            print_result(&response, &guids, format)
        }

        Commands::Delete { guids, purge, block } => {
            let delete_type = if purge { DeleteType::Purge } else { DeleteType::Soft };
            let response = if block {
                client.delete_and_block(&guids, delete_type)?
            } else {
                client.delete(&guids, delete_type)?
            };

            for asset in response.deleted_assets() {
                println!("deleted {} {}", asset.type_name, asset.guid);
            }
            let missing = guids
                .iter()
                .filter(|g| response.deleted_assets().iter().all(|a| &a.guid != *g))
                .count();
            if missing > 0 {
                eprintln!("{} GUID(s) were not reported as deleted", missing);
            }
            Ok(())
        }
    }
}

fn fetch(
    client: &AtlanClient,
    config: &AtlanConfig,
    guid: &str,
    depth: Option<u32>,
    direction: LineageDirection,
) -> Result<LineageResponse> {
    let request = LineageRequest::new(guid)
        .depth(depth.unwrap_or(config.lineage.depth))
        .direction(direction)
        .allow_deleted_process(config.lineage.allow_deleted_process);
    request
        .fetch(client)
        .with_context(|| format!("Failed to fetch lineage for {}", guid))
}

fn print_result(response: &LineageResponse, guids: &[String], format: Format) -> Result<()> {
    match format {
        Format::Guids => {
            for guid in guids {
                println!("{}", guid);
            }
        }
        Format::Assets => {
            for guid in guids {
                match response.guid_entity_map.get(guid) {
                    Some(asset) => println!(
                        "{}\t{}\t{}",
                        asset.type_name,
                        guid,
                        asset.qualified_name().unwrap_or("")
                    ),
                    None => println!("?\t{}\t", guid),
                }
            }
        }
        Format::Dot => print!("{}", response.graph()?.to_dot()),
    }
    Ok(())
}
