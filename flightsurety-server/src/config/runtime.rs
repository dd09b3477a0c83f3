//! Validated runtime configuration.
//!
//! The network and oracle settings are defined in `flightsurety-core::config`
//! and re-exported here next to the server-only sections.

pub use flightsurety_core::config::{NetworkConfig, OracleConfig};

use flightsurety_sdk::abi::ContractAbi;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

/// Parsed interfaces of the two contracts.
#[derive(Debug, Clone)]
pub struct ContractsConfig {
    pub app_abi: Arc<ContractAbi>,
    pub data_abi: Arc<ContractAbi>,
}
