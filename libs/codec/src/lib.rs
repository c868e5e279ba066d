//! # Canonical Codec
//!
//! ## Purpose
//!
//! Bit-exact reproduction of the identifiers the on-chain contracts compute:
//! - Canonical ABI encoding of typed value lists
//! - Keccak-256 hashing
//! - Fixed, versioned key schemas (market, position, claimable funding,
//!   vault open interest, execution fee)
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → services/deployer (key CLI)
//!     ↑           ↓
//! AbiValue    encode → keccak256 → H256 key
//! ParamKind
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use codec::{market_key, AbiValue};
//! use types::Address;
//!
//! let a = AbiValue::Address(Address::repeat_byte(0x11));
//! let b = AbiValue::Address(Address::repeat_byte(0x22));
//! let key = market_key(&[a.clone(), b.clone()]).unwrap();
//! assert_ne!(key, market_key(&[b, a]).unwrap());
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Packed (`abi.encodePacked`) encoding
//! - Decoding of contract return data

pub mod encoder;
pub mod error;
pub mod hasher;
pub mod keys;

pub use encoder::{encode, schema_name, to_token, tokenize};
pub use error::CodecError;
pub use hasher::{hash_data, keccak256};
pub use keys::{
    claimable_funding_key, execution_fee_key, market_key, position_key,
    vault_open_interest_key, KeyKind, MarketKeyInfo, PositionKeyInfo, KEY_SCHEMA_VERSION,
};
pub use types::{AbiValue, ParamKind};
