//! Ethereum JSON-RPC wire types.

use crate::{Address, H256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Arbitrary binary data, serialized as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits)
            .map(HexBytes)
            .map_err(serde::de::Error::custom)
    }
}

/// A block reference for `eth_getLogs` ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockNumber {
    Earliest,
    Latest,
    Number(u64),
}

impl Serialize for BlockNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockNumber::Earliest => serializer.serialize_str("earliest"),
            BlockNumber::Latest => serializer.serialize_str("latest"),
            BlockNumber::Number(n) => serializer.collect_str(&format_args!("0x{n:x}")),
        }
    }
}

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

impl<'a, P> JsonRpcRequest<'a, P> {
    pub fn new(id: u64, method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// A JSON-RPC 2.0 response envelope.
///
/// `result` is kept as raw JSON so that a legitimate `null` result (e.g. a
/// receipt that is not available yet) can be told apart from an error.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// Error object returned by the node, e.g. on a reverted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("rpc error {code}: {message}")]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// A push notification on a subscription (`eth_subscription`).
#[derive(Debug, Deserialize)]
pub struct SubscriptionNotification<T> {
    pub method: String,
    pub params: SubscriptionParams<T>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionParams<T> {
    pub subscription: String,
    pub result: T,
}

/// Parameters of `eth_call` / `eth_sendTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HexBytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_number: Option<U256>,
    #[serde(default)]
    pub gas_used: Option<U256>,
    /// `1` on success, `0` if the transaction reverted (post-Byzantium).
    #[serde(default)]
    pub status: Option<U256>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status.is_none_or(|status| !status.is_zero())
    }
}

/// Filter for `eth_getLogs` and `eth_subscribe("logs", ...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockNumber>,
    pub address: Address,
    pub topics: Vec<H256>,
}

impl LogFilter {
    /// Match every log from `address` whose first topic is `topic`.
    pub fn new(address: Address, topic: H256) -> Self {
        Self {
            from_block: None,
            to_block: None,
            address,
            topics: vec![topic],
        }
    }

    pub fn from_block(mut self, block: BlockNumber) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn to_block(mut self, block: BlockNumber) -> Self {
        self.to_block = Some(block);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: HexBytes,
    #[serde(default)]
    pub block_number: Option<U256>,
    #[serde(default)]
    pub transaction_hash: Option<H256>,
    #[serde(default)]
    pub log_index: Option<U256>,
    /// Set when the log was dropped by a chain reorganisation.
    #[serde(default)]
    pub removed: bool,
}

impl Log {
    /// Position of the log in the chain, if the node reported it.
    pub fn id(&self) -> Option<(H256, U256)> {
        Some((self.transaction_hash?, self.log_index?))
    }
}
