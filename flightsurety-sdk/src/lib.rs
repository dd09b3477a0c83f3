//! FlightSurety SDK
//!
//! Shared building blocks for talking to the FlightSurety contracts over
//! Ethereum JSON-RPC: a Solidity ABI codec, wire and event types, and
//! (behind the `client` feature) HTTP/WebSocket clients with typed
//! contract facades.

pub mod abi;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;

pub use primitive_types::{H160, H256, U256};

/// A 20-byte account or contract address.
pub type Address = H160;

/// Parse a 40-digit hex address, with or without the `0x` prefix.
pub fn parse_address(value: &str) -> Result<Address, hex::FromHexError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)?;
    Ok(Address::from(bytes))
}
