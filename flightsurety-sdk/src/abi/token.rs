use super::{AbiError, ParamType};
use crate::{Address, U256};

/// A decoded or to-be-encoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    Uint(U256),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Token>),
    FixedArray(Vec<Token>),
}

impl Token {
    /// Whether this value is encoded in the tail section.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Bytes(_) | Token::String(_) | Token::Array(_) => true,
            Token::FixedArray(items) => items.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    /// Check whether this value can be encoded as `kind`.
    pub fn matches(&self, kind: &ParamType) -> bool {
        match (self, kind) {
            (Token::Address(_), ParamType::Address) => true,
            (Token::Bool(_), ParamType::Bool) => true,
            (Token::Uint(value), ParamType::Uint(bits)) => value.bits() <= *bits,
            (Token::FixedBytes(bytes), ParamType::FixedBytes(size)) => bytes.len() == *size,
            (Token::Bytes(_), ParamType::Bytes) => true,
            (Token::String(_), ParamType::String) => true,
            (Token::Array(items), ParamType::Array(inner)) => {
                items.iter().all(|item| item.matches(inner))
            }
            (Token::FixedArray(items), ParamType::FixedArray(inner, len)) => {
                items.len() == *len && items.iter().all(|item| item.matches(inner))
            }
            _ => false,
        }
    }

    pub fn into_address(self) -> Option<Address> {
        match self {
            Token::Address(address) => Some(address),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Token::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_uint(self) -> Option<U256> {
        match self {
            Token::Uint(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Token::Bytes(value) | Token::FixedBytes(value) => Some(value),
            _ => None,
        }
    }

    /// Elements of either a fixed or a dynamic array.
    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Token::Array(items) | Token::FixedArray(items) => Some(items),
            _ => None,
        }
    }

    /// Narrow an unsigned integer token to `u8`.
    pub fn into_u8(self) -> Result<u8, AbiError> {
        let value = self
            .into_uint()
            .ok_or_else(|| AbiError::InvalidData("expected an unsigned integer".to_string()))?;
        if value > U256::from(u8::MAX) {
            return Err(AbiError::InvalidData(format!("{value} does not fit in u8")));
        }
        Ok(value.low_u32() as u8)
    }

    /// Narrow an unsigned integer token to `u64`.
    pub fn into_u64(self) -> Result<u64, AbiError> {
        let value = self
            .into_uint()
            .ok_or_else(|| AbiError::InvalidData("expected an unsigned integer".to_string()))?;
        if value > U256::from(u64::MAX) {
            return Err(AbiError::InvalidData(format!("{value} does not fit in u64")));
        }
        Ok(value.low_u64())
    }
}

impl From<Address> for Token {
    fn from(value: Address) -> Self {
        Token::Address(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

impl From<U256> for Token {
    fn from(value: U256) -> Self {
        Token::Uint(value)
    }
}

impl From<u8> for Token {
    fn from(value: u8) -> Self {
        Token::Uint(U256::from(value))
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token::Uint(U256::from(value))
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::String(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_width_check() {
        let small = Token::from(255u8);
        assert!(small.matches(&ParamType::Uint(8)));

        let large = Token::Uint(U256::from(256u64));
        assert!(!large.matches(&ParamType::Uint(8)));
        assert!(large.matches(&ParamType::Uint(256)));
    }

    #[test]
    fn test_fixed_array_length_check() {
        let indexes = Token::FixedArray(vec![1u8.into(), 2u8.into(), 3u8.into()]);
        assert!(indexes.matches(&"uint8[3]".parse().unwrap()));
        assert!(!indexes.matches(&"uint8[2]".parse().unwrap()));
        assert!(!indexes.is_dynamic());
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(Token::from(42u64).into_u8().unwrap(), 42);
        assert!(Token::from(300u64).into_u8().is_err());
        assert!(Token::Bool(true).into_u64().is_err());
    }
}
