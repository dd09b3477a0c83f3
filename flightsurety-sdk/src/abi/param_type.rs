use super::AbiError;
use std::fmt;
use std::str::FromStr;

/// A Solidity parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Address,
    Bool,
    /// Unsigned integer with the given bit width (8..=256, multiple of 8).
    Uint(usize),
    /// `bytes1` .. `bytes32`.
    FixedBytes(usize),
    Bytes,
    String,
    /// `T[]`
    Array(Box<ParamType>),
    /// `T[k]`
    FixedArray(Box<ParamType>, usize),
}

impl ParamType {
    /// Whether values of this type are encoded in the tail section.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in the head section.
    pub fn head_size(&self) -> usize {
        match self {
            _ if self.is_dynamic() => 32,
            ParamType::FixedArray(inner, len) => inner.head_size() * len,
            _ => 32,
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(body) = s.strip_suffix(']') {
            let open = body
                .rfind('[')
                .ok_or_else(|| AbiError::InvalidType(s.to_string()))?;
            let inner: ParamType = body[..open].parse()?;
            let dimension = &body[open + 1..];
            return if dimension.is_empty() {
                Ok(ParamType::Array(Box::new(inner)))
            } else {
                let len = dimension
                    .parse()
                    .map_err(|_| AbiError::InvalidType(s.to_string()))?;
                Ok(ParamType::FixedArray(Box::new(inner), len))
            };
        }

        match s {
            "address" => Ok(ParamType::Address),
            "bool" => Ok(ParamType::Bool),
            "string" => Ok(ParamType::String),
            "bytes" => Ok(ParamType::Bytes),
            "uint" => Ok(ParamType::Uint(256)),
            _ => {
                if let Some(bits) = s.strip_prefix("uint") {
                    let bits: usize = bits
                        .parse()
                        .map_err(|_| AbiError::InvalidType(s.to_string()))?;
                    if bits == 0 || bits > 256 || bits % 8 != 0 {
                        return Err(AbiError::InvalidType(s.to_string()));
                    }
                    Ok(ParamType::Uint(bits))
                } else if let Some(size) = s.strip_prefix("bytes") {
                    let size: usize = size
                        .parse()
                        .map_err(|_| AbiError::InvalidType(s.to_string()))?;
                    if size == 0 || size > 32 {
                        return Err(AbiError::InvalidType(s.to_string()));
                    }
                    Ok(ParamType::FixedBytes(size))
                } else if s.starts_with("int") || s.starts_with("tuple") || s.starts_with("fixed")
                {
                    Err(AbiError::UnsupportedType(s.to_string()))
                } else {
                    Err(AbiError::InvalidType(s.to_string()))
                }
            }
        }
    }
}

/// Canonical form, as used in function and event signatures.
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::FixedBytes(size) => write!(f, "bytes{size}"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::String => write!(f, "string"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
            ParamType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elementary_types() {
        assert_eq!("address".parse::<ParamType>().unwrap(), ParamType::Address);
        assert_eq!("uint".parse::<ParamType>().unwrap(), ParamType::Uint(256));
        assert_eq!("uint8".parse::<ParamType>().unwrap(), ParamType::Uint(8));
        assert_eq!(
            "bytes32".parse::<ParamType>().unwrap(),
            ParamType::FixedBytes(32)
        );
        assert_eq!("string".parse::<ParamType>().unwrap(), ParamType::String);
    }

    #[test]
    fn test_parse_nested_arrays() {
        let ty: ParamType = "uint8[3][]".parse().unwrap();
        assert_eq!(
            ty,
            ParamType::Array(Box::new(ParamType::FixedArray(
                Box::new(ParamType::Uint(8)),
                3
            )))
        );
        assert!(ty.is_dynamic());
        assert_eq!(ty.to_string(), "uint8[3][]");
    }

    #[test]
    fn test_rejects_bad_types() {
        assert!(matches!(
            "uint7".parse::<ParamType>(),
            Err(AbiError::InvalidType(_))
        ));
        assert!(matches!(
            "bytes33".parse::<ParamType>(),
            Err(AbiError::InvalidType(_))
        ));
        assert!(matches!(
            "int256".parse::<ParamType>(),
            Err(AbiError::UnsupportedType(_))
        ));
        assert!(matches!(
            "uint8[x]".parse::<ParamType>(),
            Err(AbiError::InvalidType(_))
        ));
    }

    #[test]
    fn test_head_size() {
        let ty: ParamType = "uint8[3]".parse().unwrap();
        assert!(!ty.is_dynamic());
        assert_eq!(ty.head_size(), 96);

        let ty: ParamType = "string[2]".parse().unwrap();
        assert!(ty.is_dynamic());
        assert_eq!(ty.head_size(), 32);
    }
}
