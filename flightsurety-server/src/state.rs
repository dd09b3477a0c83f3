//! Application state shared across all request handlers.

use compact_str::CompactString;
use flightsurety_core::oracles::OracleRegistry;
use tokio::sync::watch;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around.
#[derive(Clone)]
pub struct AppState {
    /// Name of the network the simulator is connected to.
    pub network: CompactString,
    /// Registered oracles; empty until the bootstrap completes.
    pub oracles: watch::Receiver<OracleRegistry>,
}

impl AppState {
    pub fn new(network: CompactString, oracles: watch::Receiver<OracleRegistry>) -> Self {
        Self { network, oracles }
    }

    /// The current registry snapshot.
    pub fn registry(&self) -> OracleRegistry {
        self.oracles.borrow().clone()
    }
}
