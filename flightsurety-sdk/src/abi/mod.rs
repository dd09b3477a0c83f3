//! Solidity ABI support.
//!
//! Covers the subset of the contract ABI the FlightSurety contracts use:
//! elementary types (`address`, `bool`, `uintN`, `bytesN`), dynamic
//! `bytes`/`string`, and fixed or dynamic arrays of those.

mod codec;
mod contract;
mod param_type;
mod token;

pub use codec::{decode, encode};
pub use contract::{ContractAbi, DecodedLog, Event, Function, Param};
pub use param_type::ParamType;
pub use token::Token;

use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors produced while parsing ABIs or encoding/decoding ABI data.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("unsupported parameter type: {0}")]
    UnsupportedType(String),

    #[error("invalid parameter type: {0}")]
    InvalidType(String),

    #[error("data too short: needed {needed} bytes at offset {offset}, have {len}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("argument mismatch for {function}: {reason}")]
    ArgumentMismatch { function: String, reason: String },

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("log does not match event {0}")]
    TopicMismatch(String),

    #[error("missing event parameter: {0}")]
    MissingParam(String),

    #[error("invalid contract artifact: {0}")]
    InvalidArtifact(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keccak-256 as used throughout Ethereum (not the standardized SHA3-256).
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    hasher.finalize().into()
}
