//! Head/tail encoding of ABI values.
//!
//! Static values are laid out inline in the head. Dynamic values leave a
//! 32-byte offset in the head (relative to the start of the enclosing
//! tuple) and append their content to the tail.

use super::{AbiError, ParamType, Token};
use crate::{Address, U256};

const WORD: usize = 32;

/// Encode a sequence of tokens as an ABI tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(head_len).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }

    head.extend(tail);
    head
}

/// Decode an ABI tuple of the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut offset = 0;

    for kind in types {
        if kind.is_dynamic() {
            let tail_offset = read_usize(data, offset)?;
            let tail = data.get(tail_offset..).ok_or(AbiError::OutOfBounds {
                offset: tail_offset,
                needed: 0,
                len: data.len(),
            })?;
            tokens.push(decode_dynamic(kind, tail)?);
            offset += WORD;
        } else {
            let (token, consumed) = decode_static(kind, data, offset)?;
            tokens.push(token);
            offset += consumed;
        }
    }

    Ok(tokens)
}

fn head_len(token: &Token) -> usize {
    match token {
        _ if token.is_dynamic() => WORD,
        Token::FixedArray(items) => items.iter().map(head_len).sum(),
        _ => WORD,
    }
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(address) => {
            let mut word = vec![0u8; 12];
            word.extend_from_slice(address.as_bytes());
            word
        }
        Token::Bool(value) => uint_word(U256::from(*value as u8)).to_vec(),
        Token::Uint(value) => uint_word(*value).to_vec(),
        Token::FixedBytes(bytes) => pad_right(bytes),
        Token::Bytes(bytes) => encode_length_prefixed(bytes),
        Token::String(value) => encode_length_prefixed(value.as_bytes()),
        Token::Array(items) => {
            let mut out = uint_word(U256::from(items.len())).to_vec();
            out.extend(encode(items));
            out
        }
        Token::FixedArray(items) => encode(items),
    }
}

fn encode_length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = uint_word(U256::from(bytes.len())).to_vec();
    out.extend(pad_right(bytes));
    out
}

fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.resize(bytes.len().div_ceil(WORD) * WORD, 0);
    out
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or(AbiError::OutOfBounds {
            offset,
            needed: WORD,
            len: data.len(),
        })
}

fn read_uint(data: &[u8], offset: usize) -> Result<U256, AbiError> {
    Ok(U256::from_big_endian(read_word(data, offset)?))
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = read_uint(data, offset)?;
    if value > U256::from(usize::MAX) {
        return Err(AbiError::InvalidData(format!(
            "offset or length {value} is out of range"
        )));
    }
    Ok(value.low_u64() as usize)
}

fn decode_static(kind: &ParamType, data: &[u8], offset: usize) -> Result<(Token, usize), AbiError> {
    match kind {
        ParamType::Address => {
            let word = read_word(data, offset)?;
            Ok((Token::Address(Address::from_slice(&word[12..])), WORD))
        }
        ParamType::Bool => match read_uint(data, offset)? {
            value if value.is_zero() => Ok((Token::Bool(false), WORD)),
            value if value == U256::one() => Ok((Token::Bool(true), WORD)),
            value => Err(AbiError::InvalidData(format!("{value} is not a bool"))),
        },
        ParamType::Uint(bits) => {
            let value = read_uint(data, offset)?;
            if value.bits() > *bits {
                return Err(AbiError::InvalidData(format!(
                    "{value} does not fit in uint{bits}"
                )));
            }
            Ok((Token::Uint(value), WORD))
        }
        ParamType::FixedBytes(size) => {
            let word = read_word(data, offset)?;
            Ok((Token::FixedBytes(word[..*size].to_vec()), WORD))
        }
        ParamType::FixedArray(inner, len) => {
            let mut items = Vec::with_capacity(*len);
            let mut consumed = 0;
            for _ in 0..*len {
                let (item, size) = decode_static(inner, data, offset + consumed)?;
                items.push(item);
                consumed += size;
            }
            Ok((Token::FixedArray(items), consumed))
        }
        ParamType::Bytes | ParamType::String | ParamType::Array(_) => Err(AbiError::InvalidData(
            format!("{kind} cannot be decoded in place"),
        )),
    }
}

fn decode_dynamic(kind: &ParamType, data: &[u8]) -> Result<Token, AbiError> {
    match kind {
        ParamType::Bytes => Ok(Token::Bytes(read_length_prefixed(data)?.to_vec())),
        ParamType::String => {
            let bytes = read_length_prefixed(data)?.to_vec();
            String::from_utf8(bytes)
                .map(Token::String)
                .map_err(|e| AbiError::InvalidData(format!("invalid utf-8 string: {e}")))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, 0)?;
            let body = &data[WORD..];
            // Every element takes at least one word of head space.
            if len.saturating_mul(WORD) > body.len() {
                return Err(AbiError::OutOfBounds {
                    offset: WORD,
                    needed: len.saturating_mul(WORD),
                    len: body.len(),
                });
            }
            let types = vec![(**inner).clone(); len];
            Ok(Token::Array(decode(&types, body)?))
        }
        ParamType::FixedArray(inner, len) => {
            let types = vec![(**inner).clone(); *len];
            Ok(Token::FixedArray(decode(&types, data)?))
        }
        _ => decode_static(kind, data, 0).map(|(token, _)| token),
    }
}

fn read_length_prefixed(data: &[u8]) -> Result<&[u8], AbiError> {
    let len = read_usize(data, 0)?;
    WORD.checked_add(len)
        .and_then(|end| data.get(WORD..end))
        .ok_or(AbiError::OutOfBounds {
            offset: WORD,
            needed: len,
            len: data.len(),
        })
}
