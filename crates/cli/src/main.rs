//! ChainCast IDS CLI
//!
//! A command-line tool for feeding metric samples to the IDS server,
//! querying its stability score and alerts, and watching the realtime feed.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{alerts, simulate, status, watch};

/// ChainCast IDS CLI
#[derive(Parser)]
#[command(name = "chaincast")]
#[command(author, version, about = "CLI for ChainCast IDS", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CHAINCAST_API_URL env var)
    #[arg(long, env = "CHAINCAST_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send random metric samples to the server
    Simulate {
        /// Network name reported in each sample
        #[arg(long, short)]
        network: Option<String>,

        /// Seconds between samples
        #[arg(long, short, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Stop after this many samples (runs until Ctrl-C if omitted)
        #[arg(long, short)]
        count: Option<u64>,
    },

    /// Show the current stability score
    Score,

    /// List raised alerts
    Alerts,

    /// Check server health
    Health,

    /// Stream metric and alert events as they arrive
    Watch {
        /// Exit after this many events
        #[arg(long, short)]
        limit: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let api_url = config.api_url(cli.api_url);

    // Initialize client
    let client = client::ApiClient::new(&api_url)?;

    // Execute command
    match cli.command {
        Commands::Simulate {
            network,
            interval,
            count,
        } => {
            let network = network
                .or(config.default_network)
                .unwrap_or_else(|| simulate::DEFAULT_NETWORK.to_string());
            simulate::run(&client, &network, interval, count, cli.format).await?;
        }
        Commands::Score => {
            status::show_score(&client, cli.format).await?;
        }
        Commands::Alerts => {
            alerts::list_alerts(&client, cli.format).await?;
        }
        Commands::Health => {
            status::show_health(&client, cli.format).await?;
        }
        Commands::Watch { limit } => {
            watch::run(&client, limit, cli.format).await?;
        }
    }

    Ok(())
}
