//! FlightSurety Server
//!
//! Oracle simulator for the FlightSurety contracts, plus the passenger
//! operations of the dApp as command line subcommands.

mod commands;
mod config;
mod server;
mod shutdown;
mod state;

use clap::{Parser, Subcommand};
use commands::PassengerCommand;
use config::ConfigLoader;
use flightsurety_sdk::Address;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// FlightSurety - oracle simulator and passenger client
#[derive(Parser, Debug)]
#[command(name = "flightsurety-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./flightsurety.toml")]
    config: PathBuf,

    /// Override the network entry to connect to
    #[arg(short, long, env = "FLIGHTSURETY_NETWORK")]
    network: Option<String>,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the oracles, answer oracle requests and serve the HTTP API
    Serve,
    /// Check whether the app contract is operational
    Operational,
    /// Show the passenger balance
    Balance,
    /// Register a flight for the first airline and insure it
    RegisterFlight {
        flight: String,
        /// Insurance amount in ether
        value: Decimal,
    },
    /// Ask the oracles for the status of a flight
    FetchStatus {
        #[arg(value_parser = parse_address)]
        airline: Address,
        flight: String,
        /// Departure time in unix seconds
        timestamp: u64,
    },
    /// Withdraw the passenger balance
    Withdraw,
    /// Follow balance, flight status and payout events
    Watch,
}

fn parse_address(value: &str) -> Result<Address, String> {
    flightsurety_sdk::parse_address(value).map_err(|e| format!("invalid address {value:?}: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting flightsurety-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen, args.network);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!(
        network = %loaded_config.network.name,
        url = %loaded_config.network.url,
        "Configuration loaded from {:?}",
        args.config
    );

    let passenger = match args.command {
        Command::Serve => return commands::serve(loaded_config).await,
        Command::Operational => PassengerCommand::Operational,
        Command::Balance => PassengerCommand::Balance,
        Command::RegisterFlight { flight, value } => {
            PassengerCommand::RegisterFlight { flight, value }
        }
        Command::FetchStatus {
            airline,
            flight,
            timestamp,
        } => PassengerCommand::FetchStatus {
            airline,
            flight,
            timestamp,
        },
        Command::Withdraw => PassengerCommand::Withdraw,
        Command::Watch => PassengerCommand::Watch,
    };
    commands::run_passenger(loaded_config, passenger).await
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
