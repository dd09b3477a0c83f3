//! Runtime configuration types for the FlightSurety services.
//!
//! These types represent the validated configuration shared across crates.
//! Loading and parsing the TOML file is handled by the server crate.

mod network;
mod oracle;

pub use network::{NetworkConfig, derive_ws_url};
pub use oracle::OracleConfig;
