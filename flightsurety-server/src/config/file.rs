//! TOML file configuration structures.
//!
//! These structs directly map to the `flightsurety.toml` file format.

use flightsurety_core::config::OracleConfig;
use flightsurety_sdk::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Name of the entry in `networks` to connect to.
    #[serde(default = "default_network")]
    pub network: String,
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub oracles: OracleConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:3000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000))
}

fn default_network() -> String {
    "localhost".to_string()
}

/// One deployment of the contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// HTTP JSON-RPC endpoint of the node.
    pub url: Url,
    /// WebSocket endpoint. Derived from `url` when omitted.
    #[serde(default)]
    pub ws_url: Option<Url>,
    pub app_address: Address,
    pub data_address: Address,
}

/// Locations of the compiled contract artifacts, relative to the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    #[serde(default = "default_app_artifact")]
    pub app_artifact: PathBuf,
    #[serde(default = "default_data_artifact")]
    pub data_artifact: PathBuf,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            app_artifact: default_app_artifact(),
            data_artifact: default_data_artifact(),
        }
    }
}

fn default_app_artifact() -> PathBuf {
    PathBuf::from("build/contracts/FlightSuretyApp.json")
}

fn default_data_artifact() -> PathBuf {
    PathBuf::from("build/contracts/FlightSuretyData.json")
}
