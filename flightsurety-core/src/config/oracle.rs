use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Oracle simulator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Number of simulated oracles.
    pub count: usize,
    /// Position in the node's account list of the first oracle account.
    pub first_account: usize,
    /// Gas limit of `registerOracle`.
    pub registration_gas: u64,
    /// Gas limit of `submitOracleResponse`.
    pub response_gas: u64,
    /// Block from which past `OracleRequest` events are replayed.
    pub from_block: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            count: 20,
            first_account: 29,
            registration_gas: 3_000_000,
            response_gas: 5_555_555,
            from_block: 0,
        }
    }
}

impl OracleConfig {
    /// Indexes into the node's account list used as oracles.
    pub fn account_range(&self) -> Range<usize> {
        self.first_account..self.first_account.saturating_add(self.count)
    }

    /// Minimum number of accounts the node has to expose; `None` when the
    /// oracle accounts lie beyond `usize::MAX`.
    pub fn required_accounts(&self) -> Option<usize> {
        self.first_account.checked_add(self.count)?.checked_add(1)
    }
}
