//! JSON-RPC clients and contract facades.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the ABI codec and shared types do not pull in `reqwest`.

mod contract;
mod flight_surety;
mod rpc;
mod subscription;

pub use contract::{Contract, SendOptions};
pub use flight_surety::{FlightSuretyApp, FlightSuretyData};
pub use rpc::RpcClient;
pub use subscription::LogSubscription;

use crate::H256;
use crate::abi::AbiError;
use crate::objects::JsonRpcError;

/// Errors produced by the SDK clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket transport failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// The node answered with a JSON-RPC error object.
    #[error(transparent)]
    Rpc(#[from] JsonRpcError),

    /// The node returned a non-2xx status code.
    #[error("node error: status {status}, body: {body}")]
    Node {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Call data or return data did not match the contract ABI.
    #[error("abi error: {0}")]
    Abi(#[from] AbiError),

    /// The transaction was mined but reverted.
    #[error("transaction {tx_hash:?} reverted")]
    Reverted { tx_hash: H256 },

    /// No receipt became available in time.
    #[error("no receipt for transaction {tx_hash:?}")]
    ReceiptTimeout { tx_hash: H256 },

    /// The node returned an unexpected number of values.
    #[error("unexpected output from {method}")]
    UnexpectedOutput { method: String },

    /// The subscription stream ended.
    #[error("subscription closed")]
    SubscriptionClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(value: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(value))
    }
}
