//! Event channel factories and handles.

use super::types::DappEvent;
use flightsurety_sdk::objects::OracleRequest;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// Enough to absorb a burst of replayed events while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for OracleRequest events.
pub type OracleRequestSender = mpsc::Sender<OracleRequest>;
/// Receiver handle for OracleRequest events.
pub type OracleRequestReceiver = mpsc::Receiver<OracleRequest>;

/// Sender handle for DappEvent events.
pub type DappEventSender = mpsc::Sender<DappEvent>;
/// Receiver handle for DappEvent events.
pub type DappEventReceiver = mpsc::Receiver<DappEvent>;

/// Create a new OracleRequest channel.
pub fn oracle_request_channel() -> (OracleRequestSender, OracleRequestReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new DappEvent channel.
///
/// The three passenger-facing watchers share clones of the sender.
pub fn dapp_event_channel() -> (DappEventSender, DappEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
