//! Keccak-256, the native hash of the target chains

use sha3::{Digest, Keccak256};
use types::{AbiValue, ParamKind, H256};

use crate::encoder::encode;
use crate::error::CodecError;

pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    H256::from_slice(&Keccak256::digest(data.as_ref()))
}

/// `keccak256(abi.encode(values))` under an arbitrary schema
pub fn hash_data(kinds: &[ParamKind], values: &[AbiValue]) -> Result<H256, CodecError> {
    Ok(keccak256(encode(kinds, values)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            format!("{:#x}", keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_data_propagates_mismatch() {
        assert!(hash_data(&[ParamKind::Address], &[AbiValue::Bool(true)]).is_err());
    }
}
