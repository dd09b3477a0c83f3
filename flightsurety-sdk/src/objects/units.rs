//! Conversions between wei and ether.

use crate::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Number of decimal places between wei and ether.
pub const ETHER_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("amount is too large to represent")]
    Overflow,

    #[error("amount must not be negative")]
    Negative,

    #[error("amount has more than {ETHER_DECIMALS} decimal places")]
    TooPrecise,
}

/// Convert a wei amount into ether.
///
/// Decimals carry a 96-bit mantissa, so balances above roughly 79 billion
/// ether are rejected.
pub fn wei_to_ether(wei: U256) -> Result<Decimal, UnitError> {
    if wei.bits() > 96 {
        return Err(UnitError::Overflow);
    }
    let wei = wei.low_u128() as i128;
    Decimal::try_from_i128_with_scale(wei, ETHER_DECIMALS)
        .map(|ether| ether.normalize())
        .map_err(|_| UnitError::Overflow)
}

/// Convert an ether amount into wei.
pub fn ether_to_wei(ether: Decimal) -> Result<U256, UnitError> {
    if ether.is_sign_negative() && !ether.is_zero() {
        return Err(UnitError::Negative);
    }

    let wei = ether
        .checked_mul(Decimal::from(10u64.pow(ETHER_DECIMALS)))
        .ok_or(UnitError::Overflow)?;
    if !wei.fract().is_zero() {
        return Err(UnitError::TooPrecise);
    }
    wei.trunc()
        .to_u128()
        .map(U256::from)
        .ok_or(UnitError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_wei_to_ether() {
        let one_ether = U256::from(10u64.pow(18));
        assert_eq!(wei_to_ether(one_ether).unwrap(), Decimal::ONE);
        assert_eq!(
            wei_to_ether(U256::from(1_500_000_000_000_000_000u128)).unwrap(),
            Decimal::from_str("1.5").unwrap()
        );
        assert_eq!(wei_to_ether(U256::zero()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_wei_to_ether_overflow() {
        assert_eq!(wei_to_ether(U256::MAX), Err(UnitError::Overflow));
    }

    #[test]
    fn test_ether_to_wei() {
        assert_eq!(
            ether_to_wei(Decimal::from_str("0.5").unwrap()).unwrap(),
            U256::from(500_000_000_000_000_000u128)
        );
        assert_eq!(
            ether_to_wei(Decimal::from(10)).unwrap(),
            U256::from(10_000_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_ether_to_wei_rejects_bad_amounts() {
        assert_eq!(
            ether_to_wei(Decimal::from_str("-1").unwrap()),
            Err(UnitError::Negative)
        );
        assert_eq!(
            ether_to_wei(Decimal::from_str("0.0000000000000000001").unwrap()),
            Err(UnitError::TooPrecise)
        );
    }
}
