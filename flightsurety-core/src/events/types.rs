//! Event type definitions.
//!
//! Contract events enter the pipeline through the event watchers and are
//! consumed exactly once by the processor attached to their channel.

use flightsurety_sdk::Address;
use flightsurety_sdk::objects::{
    FlightKey, FlightStatusInfo, InsurancePayout, OracleRequest, UpdatedPassengerBalance,
};

/// One `submitOracleResponse` call planned for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResponse {
    pub oracle: Address,
    pub index: u8,
    pub flight: FlightKey,
    pub status_code: u8,
}

impl OracleResponse {
    pub fn new(oracle: Address, request: &OracleRequest, status_code: u8) -> Self {
        Self {
            oracle,
            index: request.index,
            flight: request.flight.clone(),
            status_code,
        }
    }
}

/// Contract events followed by the passenger session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DappEvent {
    BalanceUpdated(UpdatedPassengerBalance),
    FlightStatus(FlightStatusInfo),
    InsurancePayout(InsurancePayout),
}

impl From<UpdatedPassengerBalance> for DappEvent {
    fn from(event: UpdatedPassengerBalance) -> Self {
        DappEvent::BalanceUpdated(event)
    }
}

impl From<FlightStatusInfo> for DappEvent {
    fn from(event: FlightStatusInfo) -> Self {
        DappEvent::FlightStatus(event)
    }
}

impl From<InsurancePayout> for DappEvent {
    fn from(event: InsurancePayout) -> Self {
        DappEvent::InsurancePayout(event)
    }
}
