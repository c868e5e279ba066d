//! Type tags and tagged values for canonical contract encoding
//!
//! `ParamKind` names a Solidity type, `AbiValue` carries a value of one.
//! Encoders pair the two positionally and reject any value whose variant
//! does not match its tag.

use std::fmt;
use std::str::FromStr;

use crate::errors::TypeError;
use crate::{format_address, Address, U256};

/// Solidity type descriptor used in key schemas and constructor signatures
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Unsigned integer of the given bit width (8..=256, multiple of 8)
    Uint(usize),
    Bool,
    /// 20-byte account identifier
    Address,
    /// UTF-8 string (dynamic)
    String,
    /// Arbitrary-length byte string (dynamic)
    Bytes,
    Tuple(Vec<ParamKind>),
}

impl ParamKind {
    pub const UINT256: ParamKind = ParamKind::Uint(256);

    /// Dynamic kinds are encoded through an offset into the tail section
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamKind::String | ParamKind::Bytes => true,
            ParamKind::Tuple(fields) => fields.iter().any(ParamKind::is_dynamic),
            _ => false,
        }
    }

    /// Width is a multiple of 8 in 8..=256
    pub fn is_valid_uint_width(bits: usize) -> bool {
        (8..=256).contains(&bits) && bits % 8 == 0
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Uint(bits) => write!(f, "uint{}", bits),
            ParamKind::Bool => write!(f, "bool"),
            ParamKind::Address => write!(f, "address"),
            ParamKind::String => write!(f, "string"),
            ParamKind::Bytes => write!(f, "bytes"),
            ParamKind::Tuple(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for ParamKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || TypeError::InvalidParamKind {
            input: s.to_string(),
        };

        if let Some(inner) = trimmed.strip_prefix('(') {
            let inner = inner.strip_suffix(')').ok_or_else(invalid)?;
            if inner.trim().is_empty() {
                return Ok(ParamKind::Tuple(Vec::new()));
            }
            let fields = split_top_level(inner)
                .ok_or_else(invalid)?
                .into_iter()
                .map(ParamKind::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ParamKind::Tuple(fields));
        }

        match trimmed {
            "bool" => Ok(ParamKind::Bool),
            "address" => Ok(ParamKind::Address),
            "string" => Ok(ParamKind::String),
            "bytes" => Ok(ParamKind::Bytes),
            "uint" => Ok(ParamKind::UINT256),
            other => {
                let bits: usize = other
                    .strip_prefix("uint")
                    .and_then(|w| w.parse().ok())
                    .ok_or_else(invalid)?;
                if !ParamKind::is_valid_uint_width(bits) {
                    return Err(invalid());
                }
                Ok(ParamKind::Uint(bits))
            }
        }
    }
}

/// Split a comma separated list, ignoring commas nested inside parentheses
fn split_top_level(input: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    parts.push(&input[start..]);
    Some(parts)
}

/// Tagged value accepted by the canonical encoder and by contract constructors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Bool(bool),
    Address(Address),
    String(String),
    Bytes(Vec<u8>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Short variant name used in mismatch diagnostics
    pub fn variant_name(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Bool(_) => "bool",
            AbiValue::Address(_) => "address",
            AbiValue::String(_) => "string",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(address) => Some(*address),
            _ => None,
        }
    }

    /// Parse command-line text as a value of `kind`
    ///
    /// Integers are decimal or `0x` hex, bytes are hex, tuples are written
    /// `(a,b,...)`. Strings are taken verbatim.
    pub fn parse(kind: &ParamKind, input: &str) -> Result<AbiValue, TypeError> {
        let invalid = || TypeError::InvalidValue {
            kind: kind.to_string(),
            input: input.to_string(),
        };
        let trimmed = input.trim();

        match kind {
            ParamKind::Uint(_) => parse_uint(trimmed).map(AbiValue::Uint),
            ParamKind::Bool => match trimmed {
                "true" => Ok(AbiValue::Bool(true)),
                "false" => Ok(AbiValue::Bool(false)),
                _ => Err(invalid()),
            },
            ParamKind::Address => crate::parse_address(trimmed).map(AbiValue::Address),
            ParamKind::String => Ok(AbiValue::String(input.to_string())),
            ParamKind::Bytes => {
                let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
                hex::decode(digits)
                    .map(AbiValue::Bytes)
                    .map_err(|_| invalid())
            }
            ParamKind::Tuple(fields) => {
                let inner = trimmed
                    .strip_prefix('(')
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(invalid)?;
                let parts = if inner.trim().is_empty() {
                    Vec::new()
                } else {
                    split_top_level(inner).ok_or_else(invalid)?
                };
                if parts.len() != fields.len() {
                    return Err(invalid());
                }
                fields
                    .iter()
                    .zip(parts)
                    .map(|(field, part)| AbiValue::parse(field, part))
                    .collect::<Result<Vec<_>, _>>()
                    .map(AbiValue::Tuple)
            }
        }
    }
}

/// Parse a decimal or `0x`-prefixed hex unsigned integer
pub fn parse_uint(input: &str) -> Result<U256, TypeError> {
    let parsed = match input.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16).ok(),
        None if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) => {
            U256::from_dec_str(input).ok()
        }
        None => None,
    };
    parsed.ok_or_else(|| TypeError::InvalidValue {
        kind: "uint".to_string(),
        input: input.to_string(),
    })
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(value) => write!(f, "{}", value),
            AbiValue::Bool(value) => write!(f, "{}", value),
            AbiValue::Address(address) => write!(f, "{}", format_address(address)),
            AbiValue::String(value) => write!(f, "{:?}", value),
            AbiValue::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            AbiValue::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<Address> for AbiValue {
    fn from(address: Address) -> Self {
        AbiValue::Address(address)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}
