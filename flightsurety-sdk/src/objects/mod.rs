//! Wire and domain objects shared by the clients, the oracle simulator and
//! the passenger session.

pub mod events;
pub mod flight;
pub mod oracle;
pub mod rpc;
pub mod units;

pub use events::{
    ContractEvent, FlightStatusInfo, InsurancePayout, OracleRequest, UpdatedPassengerBalance,
};
pub use flight::{FlightKey, FlightStatus};
pub use oracle::OracleIndexes;
pub use rpc::{
    BlockNumber, HexBytes, JsonRpcError, Log, LogFilter, TransactionReceipt, TransactionRequest,
};
pub use units::{UnitError, ether_to_wei, wei_to_ether};
