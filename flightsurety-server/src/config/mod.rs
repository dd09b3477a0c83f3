//! Configuration module for flightsurety-server.
//!
//! Handles loading configuration from the TOML file and CLI overrides, and
//! loading the contract ABIs from the compiled artifacts.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{ContractsConfig, NetworkConfig, OracleConfig, ServerConfig};
use flightsurety_core::config::derive_ws_url;
use flightsurety_sdk::abi::{AbiError, ContractAbi};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid contract artifact {path:?}: {source}")]
    ArtifactError { path: PathBuf, source: AbiError },

    #[error("network {0:?} is not configured")]
    UnknownNetwork(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub contracts: ContractsConfig,
    pub oracles: OracleConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
    network_override: Option<String>,
}

/// Functions the contract artifacts must declare.
const APP_FUNCTIONS: [&str; 9] = [
    "isOperational",
    "REGISTRATION_FEE",
    "registerOracle",
    "getMyIndexes",
    "submitOracleResponse",
    "fetchFlightStatus",
    "registerFlight",
    "getPassengerBalance",
    "withdrawPassengerFunds",
];
const APP_EVENTS: [&str; 4] = [
    "OracleRequest",
    "FlightStatusInfo",
    "UpdatedPassengerBalance",
    "InsurancePayout",
];
const DATA_FUNCTIONS: [&str; 1] = ["authorizeCaller"];

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        listen_override: Option<SocketAddr>,
        network_override: Option<String>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
            network_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Load the contract ABIs
    /// 5. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content =
            std::fs::read_to_string(&self.config_path).map_err(|source| ConfigError::IoError {
                path: self.config_path.clone(),
                source,
            })?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let Some(network) = &self.network_override {
            file_config.network = network.clone();
        }

        self.validate(&file_config)?;

        let network = self.build_network(&file_config)?;
        let contracts = ContractsConfig {
            app_abi: Arc::new(self.load_abi(
                &file_config.contracts.app_artifact,
                &APP_FUNCTIONS,
                &APP_EVENTS,
            )?),
            data_abi: Arc::new(self.load_abi(
                &file_config.contracts.data_artifact,
                &DATA_FUNCTIONS,
                &[],
            )?),
        };

        Ok(LoadedConfig {
            server: ServerConfig {
                listen: file_config.server.listen,
            },
            network,
            contracts,
            oracles: file_config.oracles,
        })
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.oracles.count == 0 {
            return Err(ConfigError::ValidationError(
                "oracles.count must be at least 1".to_string(),
            ));
        }
        if config.oracles.required_accounts().is_none() {
            return Err(ConfigError::ValidationError(
                "oracles.first_account + oracles.count is out of range".to_string(),
            ));
        }
        for (name, network) in &config.networks {
            if !matches!(network.url.scheme(), "http" | "https") {
                return Err(ConfigError::ValidationError(format!(
                    "networks.{name}.url must be an http(s) URL"
                )));
            }
            let ws_scheme = network.ws_url.as_ref().map(|url| url.scheme());
            if ws_scheme.is_some_and(|scheme| !matches!(scheme, "ws" | "wss")) {
                return Err(ConfigError::ValidationError(format!(
                    "networks.{name}.ws_url must be a ws(s) URL"
                )));
            }
        }
        Ok(())
    }

    fn build_network(&self, config: &FileConfig) -> Result<NetworkConfig, ConfigError> {
        let network = config
            .networks
            .get(&config.network)
            .ok_or_else(|| ConfigError::UnknownNetwork(config.network.clone()))?;
        let ws_url = match &network.ws_url {
            Some(ws_url) => ws_url.clone(),
            None => derive_ws_url(&network.url).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "cannot derive a WebSocket URL from {}: {e}",
                    network.url
                ))
            })?,
        };
        Ok(NetworkConfig {
            name: config.network.as_str().into(),
            url: network.url.clone(),
            ws_url,
            app_address: network.app_address,
            data_address: network.data_address,
        })
    }

    /// Artifact paths are resolved against the directory of the config file.
    fn resolve(&self, path: &Path) -> PathBuf {
        match self.config_path.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load_abi(
        &self,
        artifact: &Path,
        functions: &[&str],
        events: &[&str],
    ) -> Result<ContractAbi, ConfigError> {
        let path = self.resolve(artifact);
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
            path: path.clone(),
            source,
        })?;
        let artifact_error = |source| ConfigError::ArtifactError {
            path: path.clone(),
            source,
        };

        let abi = ContractAbi::from_json(&content).map_err(artifact_error)?;
        for name in functions {
            abi.function(name).map_err(artifact_error)?;
        }
        for name in events {
            abi.event(name).map_err(artifact_error)?;
        }
        Ok(abi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const APP_ARTIFACT: &str = r#"{
        "contractName": "FlightSuretyApp",
        "abi": [
            {"inputs": [], "name": "isOperational", "outputs": [{"name": "", "type": "bool"}], "stateMutability": "view", "type": "function"},
            {"inputs": [], "name": "REGISTRATION_FEE", "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view", "type": "function"},
            {"inputs": [], "name": "registerOracle", "outputs": [], "stateMutability": "payable", "type": "function"},
            {"inputs": [], "name": "getMyIndexes", "outputs": [{"name": "", "type": "uint8[3]"}], "stateMutability": "view", "type": "function"},
            {"inputs": [{"name": "index", "type": "uint8"}, {"name": "airline", "type": "address"}, {"name": "flight", "type": "string"}, {"name": "timestamp", "type": "uint256"}, {"name": "statusCode", "type": "uint8"}], "name": "submitOracleResponse", "outputs": [], "stateMutability": "nonpayable", "type": "function"},
            {"inputs": [{"name": "airline", "type": "address"}, {"name": "flight", "type": "string"}, {"name": "timestamp", "type": "uint256"}], "name": "fetchFlightStatus", "outputs": [], "stateMutability": "nonpayable", "type": "function"},
            {"inputs": [{"name": "airline", "type": "address"}, {"name": "flight", "type": "string"}, {"name": "timestamp", "type": "uint256"}], "name": "registerFlight", "outputs": [], "stateMutability": "payable", "type": "function"},
            {"inputs": [{"name": "passenger", "type": "address"}], "name": "getPassengerBalance", "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view", "type": "function"},
            {"inputs": [], "name": "withdrawPassengerFunds", "outputs": [], "stateMutability": "nonpayable", "type": "function"},
            {"anonymous": false, "inputs": [{"indexed": false, "name": "index", "type": "uint8"}, {"indexed": false, "name": "airline", "type": "address"}, {"indexed": false, "name": "flight", "type": "string"}, {"indexed": false, "name": "timestamp", "type": "uint256"}], "name": "OracleRequest", "type": "event"},
            {"anonymous": false, "inputs": [{"indexed": false, "name": "airline", "type": "address"}, {"indexed": false, "name": "flight", "type": "string"}, {"indexed": false, "name": "timestamp", "type": "uint256"}, {"indexed": false, "name": "status", "type": "uint8"}], "name": "FlightStatusInfo", "type": "event"},
            {"anonymous": false, "inputs": [{"indexed": false, "name": "balance", "type": "uint256"}], "name": "UpdatedPassengerBalance", "type": "event"},
            {"anonymous": false, "inputs": [{"indexed": false, "name": "timestamp", "type": "uint256"}, {"indexed": false, "name": "insurancePayoutValue", "type": "uint256"}, {"indexed": false, "name": "passengerBalance", "type": "uint256"}], "name": "InsurancePayout", "type": "event"}
        ]
    }"#;

    const DATA_ARTIFACT: &str = r#"[
        {"inputs": [{"name": "caller", "type": "address"}], "name": "authorizeCaller", "outputs": [], "stateMutability": "nonpayable", "type": "function"}
    ]"#;

    const CONFIG: &str = r#"
[networks.localhost]
url = "http://localhost:8545"
app_address = "0x0000000000000000000000000000000000000001"
data_address = "0x0000000000000000000000000000000000000002"

[networks.testnet]
url = "https://rpc.example.org"
ws_url = "wss://ws.example.org"
app_address = "0x0000000000000000000000000000000000000003"
data_address = "0x0000000000000000000000000000000000000004"

[contracts]
app_artifact = "FlightSuretyApp.json"
data_artifact = "FlightSuretyData.json"
"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn workspace(config: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "FlightSuretyApp.json", APP_ARTIFACT);
        write(dir.path(), "FlightSuretyData.json", DATA_ARTIFACT);
        let path = write(dir.path(), "flightsurety.toml", config);
        (dir, path)
    }

    #[test]
    fn test_load_resolves_artifacts_and_ws_url() {
        let (_dir, path) = workspace(CONFIG);
        let loaded = ConfigLoader::new(&path, None, None).load().unwrap();

        assert_eq!(loaded.network.name, "localhost");
        assert_eq!(loaded.network.ws_url.as_str(), "ws://localhost:8545/");
        assert!(loaded.contracts.app_abi.event("OracleRequest").is_ok());
        assert!(loaded.contracts.data_abi.function("authorizeCaller").is_ok());
        assert_eq!(loaded.oracles, OracleConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let (_dir, path) = workspace(CONFIG);
        let listen: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let loaded = ConfigLoader::new(&path, Some(listen), Some("testnet".to_string()))
            .load()
            .unwrap();

        assert_eq!(loaded.server.listen, listen);
        assert_eq!(loaded.network.name, "testnet");
        assert_eq!(loaded.network.ws_url.as_str(), "wss://ws.example.org/");
    }

    #[test]
    fn test_unknown_network() {
        let (_dir, path) = workspace(CONFIG);
        let err = ConfigLoader::new(&path, None, Some("mainnet".to_string()))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNetwork(name) if name == "mainnet"));
    }

    #[test]
    fn test_rejects_zero_oracles() {
        let (_dir, path) = workspace(&format!("{CONFIG}\n[oracles]\ncount = 0\n"));
        let err = ConfigLoader::new(&path, None, None).load().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_out_of_range_oracle_accounts() {
        let (_dir, path) = workspace(CONFIG);
        let mut config: FileConfig = toml::from_str(CONFIG).unwrap();
        config.oracles.first_account = usize::MAX;
        let err = ConfigLoader::new(&path, None, None)
            .validate(&config)
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError(message) if message.contains("first_account"))
        );
    }

    #[test]
    fn test_artifact_missing_function() {
        let (dir, path) = workspace(CONFIG);
        write(dir.path(), "FlightSuretyData.json", "[]");
        let err = ConfigLoader::new(&path, None, None).load().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ArtifactError {
                source: AbiError::UnknownFunction(_),
                ..
            }
        ));
    }
}
