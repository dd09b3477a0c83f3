//! The passenger-facing facade of the FlightSurety dApp.

mod session;

pub use session::{
    DisplayUpdate, PassengerSession, SessionAccounts, SessionError, TRANSACTION_GAS,
};
