//! Typed facades over the FlightSurety app and data contracts.

use super::{ClientError, Contract, SendOptions};
use crate::abi::Token;
use crate::objects::{FlightKey, OracleIndexes, TransactionReceipt};
use crate::{Address, U256};

fn flight_args(flight: &FlightKey) -> [Token; 3] {
    [
        flight.airline.into(),
        flight.flight.as_str().into(),
        flight.timestamp.into(),
    ]
}

/// Take the single return value of `method`.
fn single_output(method: &str, outputs: Vec<Token>) -> Result<Token, ClientError> {
    let mut outputs = outputs.into_iter();
    match (outputs.next(), outputs.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(unexpected(method)),
    }
}

fn unexpected(method: &str) -> ClientError {
    ClientError::UnexpectedOutput {
        method: method.to_string(),
    }
}

/// The `FlightSuretyApp` contract: flights, insurance and the oracle market.
#[derive(Debug, Clone)]
pub struct FlightSuretyApp {
    contract: Contract,
}

impl FlightSuretyApp {
    pub fn new(contract: Contract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub async fn is_operational(&self, from: Option<Address>) -> Result<bool, ClientError> {
        let outputs = self.contract.call("isOperational", from, &[]).await?;
        single_output("isOperational", outputs)?
            .into_bool()
            .ok_or_else(|| unexpected("isOperational"))
    }

    /// Fee in wei required by `registerOracle`.
    pub async fn registration_fee(&self) -> Result<U256, ClientError> {
        let outputs = self.contract.call("REGISTRATION_FEE", None, &[]).await?;
        single_output("REGISTRATION_FEE", outputs)?
            .into_uint()
            .ok_or_else(|| unexpected("REGISTRATION_FEE"))
    }

    pub async fn register_oracle(
        &self,
        from: Address,
        fee: U256,
        gas: u64,
    ) -> Result<TransactionReceipt, ClientError> {
        let options = SendOptions::new(from).value(fee).gas(gas);
        self.contract.send("registerOracle", options, &[]).await
    }

    /// The three indexes assigned to the oracle registered from `from`.
    pub async fn get_my_indexes(&self, from: Address) -> Result<OracleIndexes, ClientError> {
        let outputs = self.contract.call("getMyIndexes", Some(from), &[]).await?;
        let indexes = single_output("getMyIndexes", outputs)?
            .into_array()
            .ok_or_else(|| unexpected("getMyIndexes"))?;
        indexes
            .into_iter()
            .map(|index| index.into_u8().map_err(ClientError::from))
            .collect()
    }

    pub async fn submit_oracle_response(
        &self,
        from: Address,
        index: u8,
        flight: &FlightKey,
        status_code: u8,
        gas: u64,
    ) -> Result<TransactionReceipt, ClientError> {
        let [airline, name, timestamp] = flight_args(flight);
        let args = [index.into(), airline, name, timestamp, status_code.into()];
        self.contract
            .send("submitOracleResponse", SendOptions::new(from).gas(gas), &args)
            .await
    }

    /// Ask the oracles for the status of `flight`; answers arrive as
    /// `FlightStatusInfo` events.
    pub async fn fetch_flight_status(
        &self,
        from: Address,
        flight: &FlightKey,
    ) -> Result<TransactionReceipt, ClientError> {
        self.contract
            .send("fetchFlightStatus", SendOptions::new(from), &flight_args(flight))
            .await
    }

    /// Register `flight` and buy insurance for it with `value` wei.
    pub async fn register_flight(
        &self,
        from: Address,
        flight: &FlightKey,
        value: U256,
        gas: u64,
    ) -> Result<TransactionReceipt, ClientError> {
        let options = SendOptions::new(from).value(value).gas(gas);
        self.contract
            .send("registerFlight", options, &flight_args(flight))
            .await
    }

    /// Withdrawable balance of `passenger`, in wei.
    pub async fn get_passenger_balance(
        &self,
        from: Address,
        passenger: Address,
    ) -> Result<U256, ClientError> {
        let outputs = self
            .contract
            .call("getPassengerBalance", Some(from), &[passenger.into()])
            .await?;
        single_output("getPassengerBalance", outputs)?
            .into_uint()
            .ok_or_else(|| unexpected("getPassengerBalance"))
    }

    pub async fn withdraw_passenger_funds(
        &self,
        from: Address,
        gas: u64,
    ) -> Result<TransactionReceipt, ClientError> {
        self.contract
            .send("withdrawPassengerFunds", SendOptions::new(from).gas(gas), &[])
            .await
    }
}

/// The `FlightSuretyData` storage contract.
#[derive(Debug, Clone)]
pub struct FlightSuretyData {
    contract: Contract,
}

impl FlightSuretyData {
    pub fn new(contract: Contract) -> Self {
        Self { contract }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Allow `caller` (normally the app contract) to use the data contract.
    pub async fn authorize_caller(
        &self,
        from: Address,
        caller: Address,
    ) -> Result<TransactionReceipt, ClientError> {
        self.contract
            .send("authorizeCaller", SendOptions::new(from), &[caller.into()])
            .await
    }
}
