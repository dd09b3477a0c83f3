//! Simulated oracle accounts: registration at startup and the resulting
//! read-only registry.

mod bootstrap;
mod registry;

pub use bootstrap::{BootstrapError, OracleBootstrap};
pub use registry::{OracleRegistration, OracleRegistry};
