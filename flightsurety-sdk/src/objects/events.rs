//! Typed views of the FlightSurety contract events.
//!
//! Each event is decoded generically by [`Event::decode_log`](crate::abi::Event::decode_log)
//! and then converted by parameter name, so the declaration order in the
//! contract does not matter.

use super::flight::{FlightKey, FlightStatus};
use crate::abi::{AbiError, DecodedLog};
use crate::{Address, U256};
use serde::{Deserialize, Serialize};

/// A contract event that can be built from a decoded log.
pub trait ContractEvent: Sized {
    /// Event name as declared in the contract ABI.
    const NAME: &'static str;

    fn from_log(log: DecodedLog) -> Result<Self, AbiError>;
}

fn take_address(log: &mut DecodedLog, name: &str) -> Result<Address, AbiError> {
    log.take(name)?
        .into_address()
        .ok_or_else(|| AbiError::InvalidData(format!("{name} is not an address")))
}

fn take_string(log: &mut DecodedLog, name: &str) -> Result<String, AbiError> {
    log.take(name)?
        .into_string()
        .ok_or_else(|| AbiError::InvalidData(format!("{name} is not a string")))
}

fn take_uint(log: &mut DecodedLog, name: &str) -> Result<U256, AbiError> {
    log.take(name)?
        .into_uint()
        .ok_or_else(|| AbiError::InvalidData(format!("{name} is not an unsigned integer")))
}

fn take_flight(log: &mut DecodedLog) -> Result<FlightKey, AbiError> {
    Ok(FlightKey::new(
        take_address(log, "airline")?,
        take_string(log, "flight")?,
        log.take("timestamp")?.into_u64()?,
    ))
}

/// Emitted by `fetchFlightStatus`: oracles holding `index` should respond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub index: u8,
    pub flight: FlightKey,
}

impl ContractEvent for OracleRequest {
    const NAME: &'static str = "OracleRequest";

    fn from_log(mut log: DecodedLog) -> Result<Self, AbiError> {
        Ok(Self {
            index: log.take("index")?.into_u8()?,
            flight: take_flight(&mut log)?,
        })
    }
}

/// Emitted once enough oracles agree on a flight status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightStatusInfo {
    pub flight: FlightKey,
    /// Raw status code; see [`FlightStatusInfo::status`].
    pub status_code: u8,
}

impl FlightStatusInfo {
    pub fn status(&self) -> Option<FlightStatus> {
        FlightStatus::from_code(self.status_code)
    }
}

impl ContractEvent for FlightStatusInfo {
    const NAME: &'static str = "FlightStatusInfo";

    fn from_log(mut log: DecodedLog) -> Result<Self, AbiError> {
        Ok(Self {
            status_code: log.take("status")?.into_u8()?,
            flight: take_flight(&mut log)?,
        })
    }
}

/// Emitted whenever the passenger's withdrawable balance changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedPassengerBalance {
    /// Balance in wei.
    pub balance: U256,
}

impl ContractEvent for UpdatedPassengerBalance {
    const NAME: &'static str = "UpdatedPassengerBalance";

    fn from_log(mut log: DecodedLog) -> Result<Self, AbiError> {
        Ok(Self {
            balance: take_uint(&mut log, "balance")?,
        })
    }
}

/// Emitted when an insured passenger is credited after a late flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePayout {
    /// Flight timestamp the payout belongs to.
    pub timestamp: u64,
    /// Credited amount in wei.
    pub insurance_payout_value: U256,
    /// Passenger balance after the credit, in wei.
    pub passenger_balance: U256,
}

impl ContractEvent for InsurancePayout {
    const NAME: &'static str = "InsurancePayout";

    fn from_log(mut log: DecodedLog) -> Result<Self, AbiError> {
        Ok(Self {
            timestamp: log.take("timestamp")?.into_u64()?,
            insurance_payout_value: take_uint(&mut log, "insurancePayoutValue")?,
            passenger_balance: take_uint(&mut log, "passengerBalance")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Token;

    fn log(event: &str, params: Vec<(&str, Token)>) -> DecodedLog {
        DecodedLog {
            event: event.to_string(),
            params: params
                .into_iter()
                .map(|(name, token)| (name.to_string(), token))
                .collect(),
        }
    }

    #[test]
    fn test_oracle_request_from_log() {
        let airline = Address::from_low_u64_be(7);
        let request = OracleRequest::from_log(log(
            "OracleRequest",
            vec![
                ("index", 2u8.into()),
                ("airline", airline.into()),
                ("flight", "ND1309".into()),
                ("timestamp", 1_700_000_000u64.into()),
            ],
        ))
        .unwrap();

        assert_eq!(request.index, 2);
        assert_eq!(request.flight, FlightKey::new(airline, "ND1309", 1_700_000_000));
    }

    #[test]
    fn test_oracle_request_missing_field() {
        let err = OracleRequest::from_log(log("OracleRequest", vec![("index", 2u8.into())]))
            .unwrap_err();
        assert!(matches!(err, AbiError::MissingParam(name) if name == "airline"));
    }

    #[test]
    fn test_flight_status_info_unknown_code() {
        let info = FlightStatusInfo::from_log(log(
            "FlightStatusInfo",
            vec![
                ("airline", Address::zero().into()),
                ("flight", "AB1".into()),
                ("timestamp", 1u64.into()),
                ("status", 25u8.into()),
            ],
        ))
        .unwrap();
        assert_eq!(info.status_code, 25);
        assert_eq!(info.status(), None);
    }

    #[test]
    fn test_insurance_payout_from_log() {
        let payout = InsurancePayout::from_log(log(
            "InsurancePayout",
            vec![
                ("timestamp", 99u64.into()),
                ("insurancePayoutValue", Token::Uint(U256::from(15u64))),
                ("passengerBalance", Token::Uint(U256::from(30u64))),
            ],
        ))
        .unwrap();
        assert_eq!(payout.timestamp, 99);
        assert_eq!(payout.insurance_payout_value, U256::from(15u64));
        assert_eq!(payout.passenger_balance, U256::from(30u64));
    }
}
