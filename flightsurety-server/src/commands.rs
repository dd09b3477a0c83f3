//! Subcommand implementations: the oracle simulator and the passenger
//! operations of the dApp.

use crate::config::LoadedConfig;
use crate::server::{build_router, run_server};
use crate::shutdown::spawn_shutdown_listener;
use crate::state::AppState;
use anyhow::{Context, anyhow};
use flightsurety_core::dapp::PassengerSession;
use flightsurety_core::events::{dapp_event_channel, oracle_request_channel};
use flightsurety_core::gateway::{ContractGateway, OracleGateway};
use flightsurety_core::oracles::{OracleBootstrap, OracleRegistry};
use flightsurety_core::processors::{EventWatcher, OracleDispatcher};
use flightsurety_sdk::Address;
use flightsurety_sdk::client::{
    ClientError, Contract, FlightSuretyApp, FlightSuretyData, RpcClient,
};
use flightsurety_sdk::objects::{
    BlockNumber, FlightStatusInfo, InsurancePayout, OracleRequest, UpdatedPassengerBalance,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Passenger operations exposed on the command line.
#[derive(Debug, Clone)]
pub enum PassengerCommand {
    Operational,
    Balance,
    RegisterFlight {
        flight: String,
        value: Decimal,
    },
    FetchStatus {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    Withdraw,
    Watch,
}

/// Contract facades bound to the configured network.
fn connect(config: &LoadedConfig) -> (FlightSuretyApp, FlightSuretyData) {
    let rpc = RpcClient::new(config.network.url.clone());
    let app = Contract::new(
        rpc.clone(),
        config.network.app_address,
        Arc::clone(&config.contracts.app_abi),
    );
    let data = Contract::new(
        rpc,
        config.network.data_address,
        Arc::clone(&config.contracts.data_abi),
    );
    (FlightSuretyApp::new(app), FlightSuretyData::new(data))
}

/// Run the oracle simulator and its HTTP endpoint until shutdown.
///
/// The request watcher ending before shutdown stops everything and makes
/// the command fail.
pub async fn serve(config: LoadedConfig) -> anyhow::Result<()> {
    let (app, data) = connect(&config);
    let shutdown_tx = spawn_shutdown_listener();
    let shutdown_rx = shutdown_tx.subscribe();

    let (registry_tx, registry_rx) = watch::channel(OracleRegistry::default());
    let router = build_router(AppState::new(config.network.name.clone(), registry_rx));
    tracing::info!("Starting HTTP server on {}", config.server.listen);
    let server = tokio::spawn(run_server(router, config.server.listen, shutdown_rx.clone()));

    let gateway: Arc<dyn OracleGateway> = Arc::new(ContractGateway::new(
        app.clone(),
        data,
        config.oracles.registration_gas,
        config.oracles.response_gas,
    ));
    let registry = match OracleBootstrap::new(Arc::clone(&gateway), config.oracles)
        .run()
        .await
    {
        Ok(registry) => registry,
        Err(e) => {
            shutdown_tx.send_replace(true);
            server.await??;
            return Err(e).context("oracle bootstrap failed");
        }
    };
    registry_tx.send_replace(registry.clone());

    let (request_tx, request_rx) = oracle_request_channel();
    let watcher = EventWatcher::<OracleRequest>::new(
        app.contract().clone(),
        config.network.ws_url.clone(),
        BlockNumber::Number(config.oracles.from_block),
    );
    let watcher = tokio::spawn(watcher.run(shutdown_rx.clone(), request_tx));
    let dispatcher =
        tokio::spawn(OracleDispatcher::new(gateway, registry).run(shutdown_rx.clone(), request_rx));

    let watched = watcher.await?;
    let outcome = pipeline_outcome(watched, *shutdown_rx.borrow());
    if let Err(e) = &outcome {
        error!(error = %e, "Oracle pipeline stopped, shutting down");
    }
    shutdown_tx.send_replace(true);

    dispatcher.await?;
    server.await??;
    outcome?;
    info!("Server shutdown complete");
    Ok(())
}

/// Judge how the request watcher ended. Anything but a clean stop after a
/// shutdown request is a failure of the oracle pipeline.
fn pipeline_outcome(
    watched: Result<(), ClientError>,
    shutting_down: bool,
) -> anyhow::Result<()> {
    match watched {
        Err(e) => Err(e).context("failed to watch OracleRequest events"),
        Ok(()) if !shutting_down => Err(anyhow!("OracleRequest watcher stopped unexpectedly")),
        Ok(()) => Ok(()),
    }
}

/// Run one passenger operation and print its result.
pub async fn run_passenger(config: LoadedConfig, command: PassengerCommand) -> anyhow::Result<()> {
    let (app, _) = connect(&config);
    let session = PassengerSession::initialize(app.clone())
        .await
        .context("failed to initialize passenger session")?;

    match command {
        PassengerCommand::Operational => {
            println!("Operational: {}", session.is_operational().await?);
        }
        PassengerCommand::Balance => {
            println!("Passenger balance: {} ETH", session.get_passenger_balance().await?);
        }
        PassengerCommand::RegisterFlight { flight, value } => {
            let flight = session.register_flight(&flight, value).await?;
            println!(
                "Registered flight {} for airline {:?} at {}",
                flight.flight, flight.airline, flight.timestamp
            );
        }
        PassengerCommand::FetchStatus {
            airline,
            flight,
            timestamp,
        } => {
            let receipt = session
                .fetch_flight_status(airline, &flight, timestamp)
                .await?;
            println!(
                "Requested status of flight {flight} (tx {:?})",
                receipt.transaction_hash
            );
        }
        PassengerCommand::Withdraw => {
            let receipt = session.withdraw_passenger_funds().await?;
            println!("Withdrawn passenger funds (tx {:?})", receipt.transaction_hash);
        }
        PassengerCommand::Watch => watch_events(&config, app, session).await?,
    }
    Ok(())
}

/// Follow the passenger-facing events until shutdown.
///
/// The first watcher failure stops the other watchers and the session, and
/// is returned.
async fn watch_events(
    config: &LoadedConfig,
    app: FlightSuretyApp,
    session: PassengerSession,
) -> anyhow::Result<()> {
    let shutdown_tx = spawn_shutdown_listener();
    let shutdown_rx = shutdown_tx.subscribe();
    let (event_tx, event_rx) = dapp_event_channel();
    let contract = app.contract();
    let ws_url = &config.network.ws_url;

    let mut watchers = JoinSet::new();
    watchers.spawn(
        EventWatcher::<UpdatedPassengerBalance>::new(
            contract.clone(),
            ws_url.clone(),
            BlockNumber::Earliest,
        )
        .run(shutdown_rx.clone(), event_tx.clone()),
    );
    watchers.spawn(
        EventWatcher::<FlightStatusInfo>::new(
            contract.clone(),
            ws_url.clone(),
            BlockNumber::Earliest,
        )
        .run(shutdown_rx.clone(), event_tx.clone()),
    );
    watchers.spawn(
        EventWatcher::<InsurancePayout>::new(
            contract.clone(),
            ws_url.clone(),
            BlockNumber::Earliest,
        )
        .run(shutdown_rx.clone(), event_tx),
    );

    let supervise = async {
        let mut first_failure = None;
        while let Some(joined) = watchers.join_next().await {
            if let Err(e) = joined? {
                error!(error = %e, "Event watcher failed");
                if first_failure.is_none() {
                    shutdown_tx.send_replace(true);
                    first_failure = Some(e);
                }
            }
        }
        match first_failure {
            Some(e) => Err(e).context("failed to watch passenger events"),
            None => Ok(()),
        }
    };

    println!("Passenger balance: {} ETH", session.balance());
    let (supervised, ()) = tokio::join!(
        supervise,
        session.run(shutdown_rx, event_rx, |update| println!("{update}"))
    );
    supervised
}
