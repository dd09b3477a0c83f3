//! Event system for the oracle simulator and the passenger session.
//!
//! # Event Flow
//!
//! 1. `EventWatcher<OracleRequest>` -> `OracleDispatcher`, which spawns one
//!    `submitOracleResponse` per matching oracle
//! 2. `EventWatcher<UpdatedPassengerBalance | FlightStatusInfo | InsurancePayout>`
//!    -> `DappEvent` -> `PassengerSession`

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, DappEventReceiver, DappEventSender, OracleRequestReceiver,
    OracleRequestSender, dapp_event_channel, oracle_request_channel,
};

pub use types::{DappEvent, OracleResponse};
