//! Wallet Profiler - behavioral profiles from Aptos transaction history
//!
//! Fetches a wallet's recent transactions, normalizes them and prints a
//! profile, a function transition graph, a timeline or LLM insights as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

// Use the library crate
use wallet_profiler::cli::commands;
use wallet_profiler::config::Config;

/// Wallet Profiler - Aptos wallet behavior analysis
#[derive(Parser)]
#[command(name = "wallet-profiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "profiler.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the wallet profile (persona, categories, top functions)
    Profile {
        /// Wallet address
        address: String,

        /// Skip fetching coin balances (disables the Diversified Investor rule)
        #[arg(long)]
        no_balances: bool,

        /// Attach LLM insights (health summary, handle, entities) to the profile
        #[arg(long)]
        insights: bool,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the function-call transition graph
    Graph {
        /// Wallet address
        address: String,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the per-function timeline
    Timeline {
        /// Wallet address
        address: String,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate LLM insights (health summary, handle, entities)
    Insights {
        /// Wallet address
        address: String,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr keeps stdout clean for JSON)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wallet_profiler=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Profile {
            address,
            no_balances,
            insights,
            output,
        } => commands::profile(&config, &address, !no_balances, insights, output.as_deref()).await,
        Commands::Graph { address, output } => {
            commands::graph(&config, &address, output.as_deref()).await
        }
        Commands::Timeline { address, output } => {
            commands::timeline(&config, &address, output.as_deref()).await
        }
        Commands::Insights { address, output } => {
            commands::insights(&config, &address, output.as_deref()).await
        }
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
