//! Contract operations needed by the oracle simulator.
//!
//! The bootstrap and the dispatcher only talk to the chain through
//! [`OracleGateway`], so they can be driven by an in-memory double in tests.

use async_trait::async_trait;
use flightsurety_sdk::client::{ClientError, FlightSuretyApp, FlightSuretyData};
use flightsurety_sdk::objects::{FlightKey, OracleIndexes};
use flightsurety_sdk::{Address, U256};

#[async_trait]
pub trait OracleGateway: Send + Sync {
    /// Accounts managed by the node.
    async fn accounts(&self) -> Result<Vec<Address>, ClientError>;

    /// Authorize the app contract on the data contract, sent from `owner`.
    async fn authorize_app(&self, owner: Address) -> Result<(), ClientError>;

    /// Fee in wei required to register an oracle.
    async fn registration_fee(&self) -> Result<U256, ClientError>;

    async fn register_oracle(&self, oracle: Address, fee: U256) -> Result<(), ClientError>;

    async fn oracle_indexes(&self, oracle: Address) -> Result<OracleIndexes, ClientError>;

    async fn submit_response(
        &self,
        oracle: Address,
        index: u8,
        flight: &FlightKey,
        status_code: u8,
    ) -> Result<(), ClientError>;
}

/// [`OracleGateway`] backed by the deployed contracts.
#[derive(Debug, Clone)]
pub struct ContractGateway {
    app: FlightSuretyApp,
    data: FlightSuretyData,
    registration_gas: u64,
    response_gas: u64,
}

impl ContractGateway {
    pub fn new(
        app: FlightSuretyApp,
        data: FlightSuretyData,
        registration_gas: u64,
        response_gas: u64,
    ) -> Self {
        Self {
            app,
            data,
            registration_gas,
            response_gas,
        }
    }
}

#[async_trait]
impl OracleGateway for ContractGateway {
    async fn accounts(&self) -> Result<Vec<Address>, ClientError> {
        self.app.contract().rpc().accounts().await
    }

    async fn authorize_app(&self, owner: Address) -> Result<(), ClientError> {
        self.data.authorize_caller(owner, self.app.address()).await?;
        Ok(())
    }

    async fn registration_fee(&self) -> Result<U256, ClientError> {
        self.app.registration_fee().await
    }

    async fn register_oracle(&self, oracle: Address, fee: U256) -> Result<(), ClientError> {
        self.app
            .register_oracle(oracle, fee, self.registration_gas)
            .await?;
        Ok(())
    }

    async fn oracle_indexes(&self, oracle: Address) -> Result<OracleIndexes, ClientError> {
        self.app.get_my_indexes(oracle).await
    }

    async fn submit_response(
        &self,
        oracle: Address,
        index: u8,
        flight: &FlightKey,
        status_code: u8,
    ) -> Result<(), ClientError> {
        self.app
            .submit_oracle_response(oracle, index, flight, status_code, self.response_gas)
            .await?;
        Ok(())
    }
}
