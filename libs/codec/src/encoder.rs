//! Canonical encoder
//!
//! Produces the contract ABI encoding (`abi.encode`) of a list of values,
//! the same bytes Solidity computes on-chain before hashing a key.
//!
//! ## Byte layout
//!
//! Each top-level field occupies one 32-byte head word, in declared order:
//!
//! - `uintW`   - big-endian integer left-padded with zeros to 32 bytes
//! - `bool`    - `0` or `1` left-padded to 32 bytes
//! - `address` - 12 zero bytes followed by the 20 address bytes
//! - `string`, `bytes` - head word holds the big-endian byte offset of the
//!   tail; the tail is a 32-byte length word followed by the raw bytes
//!   right-padded with zeros to a multiple of 32
//! - tuple     - static tuples are inlined field by field; a tuple with any
//!   dynamic field is itself dynamic and referenced by offset
//!
//! There is exactly one encoding per (kinds, values) pair. Values are checked
//! against their tags before any byte is produced.

use ethabi::Token;
use types::{AbiValue, ParamKind};

use crate::error::CodecError;

/// Encode `values` under the ordered type tags `kinds`
pub fn encode(kinds: &[ParamKind], values: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    let tokens = tokenize(kinds, values)?;
    Ok(ethabi::encode(&tokens))
}

/// Validate `values` against `kinds` and convert them to ABI tokens
pub fn tokenize(kinds: &[ParamKind], values: &[AbiValue]) -> Result<Vec<Token>, CodecError> {
    let schema = schema_name(kinds);
    if kinds.len() != values.len() {
        return Err(CodecError::arity(schema, kinds.len(), values.len()));
    }

    kinds
        .iter()
        .zip(values)
        .enumerate()
        .map(|(position, (kind, value))| {
            check(kind, value).map_err(|reason| CodecError::field(&schema, position, reason))?;
            Ok(to_token(value))
        })
        .collect()
}

/// Tuple-style rendering of a schema, e.g. `(address,bool)`
pub fn schema_name(kinds: &[ParamKind]) -> String {
    ParamKind::Tuple(kinds.to_vec()).to_string()
}

fn check(kind: &ParamKind, value: &AbiValue) -> Result<(), String> {
    match (kind, value) {
        (ParamKind::Uint(bits), AbiValue::Uint(number)) => {
            if !ParamKind::is_valid_uint_width(*bits) {
                return Err(format!("unsupported integer width {}", bits));
            }
            if number.bits() > *bits {
                return Err(format!("value {} does not fit in uint{}", number, bits));
            }
            Ok(())
        }
        (ParamKind::Bool, AbiValue::Bool(_))
        | (ParamKind::Address, AbiValue::Address(_))
        | (ParamKind::String, AbiValue::String(_))
        | (ParamKind::Bytes, AbiValue::Bytes(_)) => Ok(()),
        (ParamKind::Tuple(fields), AbiValue::Tuple(items)) => {
            if fields.len() != items.len() {
                return Err(format!(
                    "tuple {} expects {} fields, got {}",
                    kind,
                    fields.len(),
                    items.len()
                ));
            }
            for (index, (field, item)) in fields.iter().zip(items).enumerate() {
                check(field, item).map_err(|reason| format!("tuple field {}: {}", index, reason))?;
            }
            Ok(())
        }
        (kind, value) => Err(format!("expected {}, got {}", kind, value.variant_name())),
    }
}

/// Convert a value to its ABI token without a schema check
pub fn to_token(value: &AbiValue) -> Token {
    match value {
        AbiValue::Uint(number) => Token::Uint(*number),
        AbiValue::Bool(flag) => Token::Bool(*flag),
        AbiValue::Address(address) => Token::Address(*address),
        AbiValue::String(text) => Token::String(text.clone()),
        AbiValue::Bytes(bytes) => Token::Bytes(bytes.clone()),
        AbiValue::Tuple(items) => Token::Tuple(items.iter().map(to_token).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Address, U256};

    fn word(n: u64) -> [u8; 32] {
        let mut out = [0u8; 32];
        U256::from(n).to_big_endian(&mut out);
        out
    }

    #[test]
    fn test_uint_is_big_endian_word() {
        let encoded = encode(&[ParamKind::Uint(256)], &[AbiValue::from(0x0102u64)]).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[30], 0x01);
        assert_eq!(encoded[31], 0x02);
        assert!(encoded[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_address_is_left_padded() {
        let address = Address::repeat_byte(0xab);
        let encoded = encode(&[ParamKind::Address], &[AbiValue::Address(address)]).unwrap();
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..], address.as_bytes());
    }

    #[test]
    fn test_bool_encoding() {
        let encoded = encode(
            &[ParamKind::Bool, ParamKind::Bool],
            &[AbiValue::Bool(true), AbiValue::Bool(false)],
        )
        .unwrap();
        assert_eq!(&encoded[..32], &word(1));
        assert_eq!(&encoded[32..], &word(0));
    }

    #[test]
    fn test_string_uses_offset_and_padding() {
        let encoded = encode(&[ParamKind::String], &[AbiValue::from("CONFIG")]).unwrap();
        assert_eq!(encoded.len(), 96);
        assert_eq!(&encoded[..32], &word(32));
        assert_eq!(&encoded[32..64], &word(6));
        assert_eq!(&encoded[64..70], b"CONFIG");
        assert!(encoded[70..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_static_tuple_is_inlined() {
        let kinds = [ParamKind::Tuple(vec![ParamKind::Uint(8), ParamKind::Bool])];
        let values = [AbiValue::Tuple(vec![AbiValue::from(3u64), AbiValue::Bool(true)])];
        let encoded = encode(&kinds, &values).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[..32], &word(3));
        assert_eq!(&encoded[32..], &word(1));
    }

    #[test]
    fn test_arity_mismatch() {
        let err = encode(&[ParamKind::Address], &[]).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch { position: None, .. }));
    }

    #[test]
    fn test_variant_mismatch_is_not_coerced() {
        let err = encode(&[ParamKind::Bool], &[AbiValue::from(1u64)]).unwrap_err();
        assert_eq!(
            err,
            CodecError::SchemaMismatch {
                schema: "(bool)".to_string(),
                position: Some(0),
                reason: "expected bool, got uint".to_string(),
            }
        );
    }

    #[test]
    fn test_uint_width_overflow() {
        let err = encode(&[ParamKind::Uint(8)], &[AbiValue::from(256u64)]).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch { position: Some(0), .. }));
        assert!(encode(&[ParamKind::Uint(8)], &[AbiValue::from(255u64)]).is_ok());
    }

    #[test]
    fn test_nested_tuple_arity() {
        let kinds = [ParamKind::Tuple(vec![ParamKind::Address, ParamKind::Bool])];
        let values = [AbiValue::Tuple(vec![AbiValue::Bool(true)])];
        assert!(encode(&kinds, &values).is_err());
    }
}
