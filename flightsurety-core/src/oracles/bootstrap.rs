//! Oracle registration performed once at startup.
//!
//! The bootstrap:
//! - checks that the node exposes enough accounts
//! - authorizes the app contract on the data contract
//! - registers every oracle account concurrently, paying the registration fee
//! - reads back the indexes assigned to each oracle
//!
//! Accounts whose registration fails are logged and left out of the registry.

use super::registry::{OracleRegistration, OracleRegistry};
use crate::config::OracleConfig;
use crate::gateway::OracleGateway;
use flightsurety_sdk::client::ClientError;
use flightsurety_sdk::{Address, U256};
use futures_util::future::join_all;
use itertools::Itertools;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The node does not manage enough accounts for the configured oracles.
    #[error("must have minimum {required} accounts, node exposes {available}")]
    NotEnoughAccounts { required: usize, available: usize },

    #[error("oracle accounts start at {first_account} and do not fit the account list")]
    AccountRangeOverflow { first_account: usize },

    #[error("contract call failed: {0}")]
    Client(#[from] ClientError),
}

pub struct OracleBootstrap {
    gateway: Arc<dyn OracleGateway>,
    config: OracleConfig,
}

impl OracleBootstrap {
    pub fn new(gateway: Arc<dyn OracleGateway>, config: OracleConfig) -> Self {
        Self { gateway, config }
    }

    /// Register the oracle accounts and return the frozen registry.
    pub async fn run(&self) -> Result<OracleRegistry, BootstrapError> {
        let accounts = self.gateway.accounts().await?;
        let required = self.config.required_accounts().ok_or(
            BootstrapError::AccountRangeOverflow {
                first_account: self.config.first_account,
            },
        )?;
        if accounts.len() < required {
            return Err(BootstrapError::NotEnoughAccounts {
                required,
                available: accounts.len(),
            });
        }

        // The data contract may already trust the app; a rejection is not fatal.
        if let Err(e) = self.gateway.authorize_app(accounts[0]).await {
            warn!(owner = ?accounts[0], error = %e, "Failed to authorize app contract");
        }

        let fee = self.gateway.registration_fee().await?;
        debug!(fee = %fee, "Read oracle registration fee");

        let registrations = join_all(
            accounts[self.config.account_range()]
                .iter()
                .map(|&oracle| self.register(oracle, fee)),
        )
        .await;

        let registry: OracleRegistry = registrations.into_iter().flatten().collect();
        info!(
            registered = registry.len(),
            requested = self.config.count,
            "Oracle Registered"
        );
        Ok(registry)
    }

    async fn register(&self, oracle: Address, fee: U256) -> Option<OracleRegistration> {
        let result = async {
            self.gateway.register_oracle(oracle, fee).await?;
            self.gateway.oracle_indexes(oracle).await
        }
        .await;

        match result {
            Ok(indexes) => {
                debug!(
                    oracle = ?oracle,
                    indexes = %indexes.iter().join(","),
                    "Oracle registered"
                );
                Some(OracleRegistration::new(oracle, indexes))
            }
            Err(e) => {
                warn!(oracle = ?oracle, error = %e, "Oracle registration failed");
                None
            }
        }
    }
}
