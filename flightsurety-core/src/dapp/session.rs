//! PassengerSession.
//!
//! Holds the accounts of a dApp session (owner, airlines, passengers), wraps
//! the passenger operations of the app contract and mirrors the passenger
//! balance in ether. Contract events are turned into [`DisplayUpdate`]s by
//! the `Processor<DappEvent>` implementation.

use crate::events::{DappEvent, DappEventReceiver};
use flightsurety_sdk::client::{ClientError, FlightSuretyApp};
use flightsurety_sdk::objects::{
    FlightKey, FlightStatus, TransactionReceipt, UnitError, ether_to_wei, wei_to_ether,
};
use flightsurety_sdk::{Address, U256};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const AIRLINE_COUNT: usize = 5;
const PASSENGER_COUNT: usize = 5;

/// Gas limit of `registerFlight` and `withdrawPassengerFunds`.
pub const TRANSACTION_GAS: u64 = 3_000_000;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("must have minimum {required} accounts, node exposes {available}")]
    NotEnoughAccounts { required: usize, available: usize },

    #[error("contract call failed: {0}")]
    Client(#[from] ClientError),

    #[error("invalid amount: {0}")]
    Unit(#[from] UnitError),
}

/// Accounts used by a session: `accounts[0]` is the owner, followed by five
/// airlines and five passengers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAccounts {
    pub owner: Address,
    pub airlines: Vec<Address>,
    pub passengers: Vec<Address>,
}

impl SessionAccounts {
    pub fn from_accounts(accounts: &[Address]) -> Result<Self, SessionError> {
        let required = 1 + AIRLINE_COUNT + PASSENGER_COUNT;
        let Some((&owner, rest)) = accounts.split_first() else {
            return Err(SessionError::NotEnoughAccounts {
                required,
                available: 0,
            });
        };
        if accounts.len() < required {
            return Err(SessionError::NotEnoughAccounts {
                required,
                available: accounts.len(),
            });
        }
        let (airlines, rest) = rest.split_at(AIRLINE_COUNT);
        Ok(Self {
            owner,
            airlines: airlines.to_vec(),
            passengers: rest[..PASSENGER_COUNT].to_vec(),
        })
    }

    /// The airline flights are registered for.
    pub fn first_airline(&self) -> Address {
        self.airlines.first().copied().unwrap_or(self.owner)
    }
}

/// A change the passenger should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUpdate {
    /// New balance, in ether.
    Balance(Decimal),
    FlightStatus {
        flight: FlightKey,
        status_code: u8,
    },
    InsurancePayout {
        timestamp: u64,
        /// Credited amount, in ether.
        payout: Decimal,
        /// Balance after the credit, in ether.
        balance: Decimal,
    },
}

impl fmt::Display for DisplayUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayUpdate::Balance(balance) => write!(f, "Passenger balance: {balance} ETH"),
            DisplayUpdate::FlightStatus {
                flight,
                status_code,
            } => {
                write!(
                    f,
                    "Flight {} ({:?}, {}): ",
                    flight.flight, flight.airline, flight.timestamp
                )?;
                match FlightStatus::from_code(*status_code) {
                    Some(status) => write!(f, "{status}"),
                    None => write!(f, "status code {status_code}"),
                }
            }
            DisplayUpdate::InsurancePayout {
                timestamp,
                payout,
                balance,
            } => write!(
                f,
                "Insurance payout for flight at {timestamp}: {payout} ETH, new balance {balance} ETH"
            ),
        }
    }
}

pub struct PassengerSession {
    app: FlightSuretyApp,
    accounts: SessionAccounts,
    balance_tx: watch::Sender<Decimal>,
}

impl PassengerSession {
    pub fn new(app: FlightSuretyApp, accounts: SessionAccounts, balance: Decimal) -> Self {
        let (balance_tx, _) = watch::channel(balance);
        Self {
            app,
            accounts,
            balance_tx,
        }
    }

    /// Resolve the session accounts from the node and read the initial
    /// passenger balance.
    pub async fn initialize(app: FlightSuretyApp) -> Result<Self, SessionError> {
        let accounts = app.contract().rpc().accounts().await?;
        let accounts = SessionAccounts::from_accounts(&accounts)?;
        let balance = app
            .get_passenger_balance(accounts.owner, accounts.owner)
            .await?;
        let balance = wei_to_ether(balance)?;
        debug!(owner = ?accounts.owner, balance = %balance, "Passenger session initialized");
        Ok(Self::new(app, accounts, balance))
    }

    pub fn accounts(&self) -> &SessionAccounts {
        &self.accounts
    }

    /// The mirrored passenger balance, in ether.
    pub fn balance(&self) -> Decimal {
        *self.balance_tx.borrow()
    }

    /// Follow changes of the mirrored balance.
    pub fn subscribe_balance(&self) -> watch::Receiver<Decimal> {
        self.balance_tx.subscribe()
    }

    fn set_balance(&self, balance: Decimal) {
        self.balance_tx.send_replace(balance);
    }

    pub async fn is_operational(&self) -> Result<bool, SessionError> {
        Ok(self.app.is_operational(Some(self.accounts.owner)).await?)
    }

    /// Ask the oracles for the status of a flight.
    pub async fn fetch_flight_status(
        &self,
        airline: Address,
        flight: &str,
        timestamp: u64,
    ) -> Result<TransactionReceipt, SessionError> {
        let flight = FlightKey::new(airline, flight, timestamp);
        Ok(self
            .app
            .fetch_flight_status(self.accounts.owner, &flight)
            .await?)
    }

    /// Register `flight` for the first airline, departing now, insured with
    /// `value` ether.
    pub async fn register_flight(
        &self,
        flight: &str,
        value: Decimal,
    ) -> Result<FlightKey, SessionError> {
        let wei = ether_to_wei(value)?;
        let timestamp = time::OffsetDateTime::now_utc().unix_timestamp().max(0) as u64;
        let flight = FlightKey::new(self.accounts.first_airline(), flight, timestamp);
        self.app
            .register_flight(self.accounts.owner, &flight, wei, TRANSACTION_GAS)
            .await?;
        info!(flight = %flight.flight, timestamp, value = %value, "Flight registered");
        Ok(flight)
    }

    /// Read the passenger balance from the contract and refresh the mirror.
    pub async fn get_passenger_balance(&self) -> Result<Decimal, SessionError> {
        let wei: U256 = self
            .app
            .get_passenger_balance(self.accounts.owner, self.accounts.owner)
            .await?;
        let balance = wei_to_ether(wei)?;
        self.set_balance(balance);
        Ok(balance)
    }

    pub async fn withdraw_passenger_funds(&self) -> Result<TransactionReceipt, SessionError> {
        Ok(self
            .app
            .withdraw_passenger_funds(self.accounts.owner, TRANSACTION_GAS)
            .await?)
    }

    /// Apply contract events until shutdown or until the event channel closes,
    /// handing every resulting update to `on_update`.
    pub async fn run(
        &self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut event_rx: DappEventReceiver,
        mut on_update: impl FnMut(&DisplayUpdate),
    ) {
        info!("PassengerSession started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("PassengerSession received shutdown signal");
                        break;
                    }
                }

                Some(event) = event_rx.recv() => {
                    match self.process(event).await {
                        Ok(updates) => updates.iter().for_each(&mut on_update),
                        Err(e) => warn!(error = %e, "Failed to apply contract event"),
                    }
                }

                else => {
                    info!("DappEvent channel closed");
                    break;
                }
            }
        }

        info!("PassengerSession shutdown complete");
    }
}

impl Processor<DappEvent> for PassengerSession {
    type Output = Vec<DisplayUpdate>;
    type Error = UnitError;

    async fn process(&self, event: DappEvent) -> Result<Vec<DisplayUpdate>, UnitError> {
        match event {
            DappEvent::BalanceUpdated(event) => {
                let balance = wei_to_ether(event.balance)?;
                self.set_balance(balance);
                Ok(vec![DisplayUpdate::Balance(balance)])
            }
            DappEvent::FlightStatus(event) => Ok(vec![DisplayUpdate::FlightStatus {
                flight: event.flight,
                status_code: event.status_code,
            }]),
            DappEvent::InsurancePayout(event) => {
                let payout = wei_to_ether(event.insurance_payout_value)?;
                let balance = wei_to_ether(event.passenger_balance)?;
                self.set_balance(balance);
                Ok(vec![
                    DisplayUpdate::InsurancePayout {
                        timestamp: event.timestamp,
                        payout,
                        balance,
                    },
                    DisplayUpdate::Balance(balance),
                ])
            }
        }
    }
}
