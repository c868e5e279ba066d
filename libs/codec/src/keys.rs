//! On-chain key derivation
//!
//! Every key is `keccak256(abi.encode(fields))` under a fixed schema. The
//! contracts compute the same digest, so schemas are versioned: changing the
//! order or count of tags in any schema below changes every key of that kind
//! and requires bumping `KEY_SCHEMA_VERSION`.

use std::fmt;
use std::str::FromStr;

use tracing::trace;
use types::{AbiValue, Address, ParamKind, H256, U256};

use crate::error::CodecError;
use crate::hasher::hash_data;

pub const KEY_SCHEMA_VERSION: u32 = 1;

/// (collateral token vault, index token)
pub const MARKET_KEY_SCHEMA: &[ParamKind] = &[ParamKind::Address, ParamKind::Address];

/// (token id, collateral token vault, index token, is long, giant token id)
pub const POSITION_KEY_SCHEMA: &[ParamKind] = &[
    ParamKind::Uint(256),
    ParamKind::Address,
    ParamKind::Address,
    ParamKind::Bool,
    ParamKind::Uint(256),
];

pub const CLAIMABLE_FUNDING_KEY_SCHEMA: &[ParamKind] =
    &[ParamKind::Address, ParamKind::Address, ParamKind::Uint(256)];

pub const VAULT_OPEN_INTEREST_KEY_SCHEMA: &[ParamKind] = &[ParamKind::Address, ParamKind::Bool];

pub const EXECUTION_FEE_KEY_SCHEMA: &[ParamKind] = &[ParamKind::String, ParamKind::String];

/// Fixed fields of the execution-fee singleton key
pub const EXECUTION_FEE_KEY_FIELDS: (&str, &str) = ("CONFIG", "EXECUTION_FEE");

/// Key kinds known to the contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Market,
    Position,
    ClaimableFunding,
    VaultOpenInterest,
    ExecutionFee,
}

impl KeyKind {
    pub const ALL: [KeyKind; 5] = [
        KeyKind::Market,
        KeyKind::Position,
        KeyKind::ClaimableFunding,
        KeyKind::VaultOpenInterest,
        KeyKind::ExecutionFee,
    ];

    pub fn schema(&self) -> &'static [ParamKind] {
        match self {
            KeyKind::Market => MARKET_KEY_SCHEMA,
            KeyKind::Position => POSITION_KEY_SCHEMA,
            KeyKind::ClaimableFunding => CLAIMABLE_FUNDING_KEY_SCHEMA,
            KeyKind::VaultOpenInterest => VAULT_OPEN_INTEREST_KEY_SCHEMA,
            KeyKind::ExecutionFee => EXECUTION_FEE_KEY_SCHEMA,
        }
    }

    /// Derive the key of this kind from caller-supplied values
    ///
    /// The execution-fee key takes no caller input; any values passed for it
    /// are a schema mismatch.
    pub fn derive(&self, values: &[AbiValue]) -> Result<H256, CodecError> {
        match self {
            KeyKind::Market => market_key(values),
            KeyKind::Position => position_key(values),
            KeyKind::ClaimableFunding => claimable_funding_key(values),
            KeyKind::VaultOpenInterest => vault_open_interest_key(values),
            KeyKind::ExecutionFee => {
                if !values.is_empty() {
                    return Err(CodecError::arity("execution fee key", 0, values.len()));
                }
                Ok(execution_fee_key())
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Market => "market",
            KeyKind::Position => "position",
            KeyKind::ClaimableFunding => "claimable-funding",
            KeyKind::VaultOpenInterest => "vault-open-interest",
            KeyKind::ExecutionFee => "execution-fee",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown key kind '{}', expected one of: market, position, claimable-funding, vault-open-interest, execution-fee",
                    s
                )
            })
    }
}

fn derive(kind: KeyKind, values: &[AbiValue]) -> Result<H256, CodecError> {
    let key = hash_data(kind.schema(), values)?;
    trace!(kind = %kind, key = %format!("{:#x}", key), "derived key");
    Ok(key)
}

pub fn market_key(values: &[AbiValue]) -> Result<H256, CodecError> {
    derive(KeyKind::Market, values)
}

pub fn position_key(values: &[AbiValue]) -> Result<H256, CodecError> {
    derive(KeyKind::Position, values)
}

pub fn claimable_funding_key(values: &[AbiValue]) -> Result<H256, CodecError> {
    derive(KeyKind::ClaimableFunding, values)
}

pub fn vault_open_interest_key(values: &[AbiValue]) -> Result<H256, CodecError> {
    derive(KeyKind::VaultOpenInterest, values)
}

/// Namespaced singleton key, not parameterized by caller input
pub fn execution_fee_key() -> H256 {
    let (namespace, name) = EXECUTION_FEE_KEY_FIELDS;
    let values = [AbiValue::from(namespace), AbiValue::from(name)];
    // schema and values are fixed constants of the same shape
    hash_data(EXECUTION_FEE_KEY_SCHEMA, &values)
        .unwrap_or_else(|e| unreachable!("execution fee key schema is static: {}", e))
}

/// Typed fields of a position key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionKeyInfo {
    pub token_id: U256,
    pub collateral_token_vault: Address,
    pub index_token: Address,
    pub is_long: bool,
    pub giant_token_id: U256,
}

impl PositionKeyInfo {
    pub fn values(&self) -> Vec<AbiValue> {
        vec![
            AbiValue::Uint(self.token_id),
            AbiValue::Address(self.collateral_token_vault),
            AbiValue::Address(self.index_token),
            AbiValue::Bool(self.is_long),
            AbiValue::Uint(self.giant_token_id),
        ]
    }

    pub fn key(&self) -> H256 {
        position_key(&self.values())
            .unwrap_or_else(|e| unreachable!("typed position fields match the schema: {}", e))
    }
}

/// Typed fields of a market key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketKeyInfo {
    pub collateral_token_vault: Address,
    pub index_token: Address,
}

impl MarketKeyInfo {
    pub fn key(&self) -> H256 {
        let values = [
            AbiValue::Address(self.collateral_token_vault),
            AbiValue::Address(self.index_token),
        ];
        market_key(&values)
            .unwrap_or_else(|e| unreachable!("typed market fields match the schema: {}", e))
    }
}
