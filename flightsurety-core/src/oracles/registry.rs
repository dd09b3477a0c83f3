use flightsurety_sdk::Address;
use flightsurety_sdk::objects::OracleIndexes;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// An oracle account together with the indexes the contract assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleRegistration {
    pub address: Address,
    pub indexes: OracleIndexes,
}

impl OracleRegistration {
    pub fn new(address: Address, indexes: OracleIndexes) -> Self {
        Self { address, indexes }
    }

    /// Whether this oracle may answer requests for `index`.
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

impl fmt::Display for OracleRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} [{}]", self.address, self.indexes.iter().join(", "))
    }
}

/// The registered oracles, frozen once bootstrap completes.
///
/// Cloning is cheap: every clone shares the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct OracleRegistry {
    oracles: Arc<[OracleRegistration]>,
}

impl OracleRegistry {
    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn as_slice(&self) -> &[OracleRegistration] {
        &self.oracles
    }

    pub fn iter(&self) -> impl Iterator<Item = &OracleRegistration> {
        self.oracles.iter()
    }

    /// Oracles holding `index`, in registration order.
    pub fn matching(&self, index: u8) -> impl Iterator<Item = &OracleRegistration> {
        self.oracles.iter().filter(move |oracle| oracle.holds(index))
    }
}

impl FromIterator<OracleRegistration> for OracleRegistry {
    fn from_iter<I: IntoIterator<Item = OracleRegistration>>(iter: I) -> Self {
        Self {
            oracles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn registry() -> OracleRegistry {
        [
            OracleRegistration::new(Address::from_low_u64_be(1), smallvec![1, 2, 3]),
            OracleRegistration::new(Address::from_low_u64_be(2), smallvec![4, 5, 6]),
            OracleRegistration::new(Address::from_low_u64_be(3), smallvec![3, 7, 9]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_matching_keeps_registration_order() {
        let registry = registry();
        let matched: Vec<_> = registry.matching(3).map(|o| o.address).collect();
        assert_eq!(
            matched,
            vec![Address::from_low_u64_be(1), Address::from_low_u64_be(3)]
        );
        assert_eq!(registry.matching(8).count(), 0);
    }

    #[test]
    fn test_clones_share_snapshot() {
        let registry = registry();
        let clone = registry.clone();
        assert!(std::ptr::eq(registry.as_slice(), clone.as_slice()));
        assert_eq!(clone.len(), 3);
    }

    #[test]
    fn test_serializes_indexes_as_list() {
        let oracle = OracleRegistration::new(Address::from_low_u64_be(1), smallvec![0, 4, 9]);
        let value = serde_json::to_value(&oracle).unwrap();
        assert_eq!(value["indexes"], serde_json::json!([0, 4, 9]));
        assert_eq!(
            value["address"],
            "0x0000000000000000000000000000000000000001"
        );
    }
}
