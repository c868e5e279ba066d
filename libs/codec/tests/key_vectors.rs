//! # Key Derivation Vectors
//!
//! Pins every key schema to digests the contracts compute for the same
//! fields. A failure here means a schema changed, which invalidates every
//! key already stored on-chain.

use codec::{
    claimable_funding_key, encode, execution_fee_key, market_key, position_key,
    vault_open_interest_key, AbiValue, KeyKind, MarketKeyInfo, PositionKeyInfo, ParamKind,
};
use types::{Address, U256};

fn addr_a() -> Address {
    Address::repeat_byte(0x11)
}

fn addr_b() -> Address {
    Address::repeat_byte(0x22)
}

fn hex_key(key: types::H256) -> String {
    format!("{:#x}", key)
}

#[test]
fn test_market_key_vector() {
    let key = market_key(&[addr_a().into(), addr_b().into()]).unwrap();
    assert_eq!(
        hex_key(key),
        "0x1bbe365357fe28ec15df954baa1b29fb309dd0e8a21208d768bce9ab1c0c4fd0"
    );
}

#[test]
fn test_market_key_is_order_sensitive() {
    let ab = market_key(&[addr_a().into(), addr_b().into()]).unwrap();
    let ba = market_key(&[addr_b().into(), addr_a().into()]).unwrap();
    assert_ne!(ab, ba);
    assert_eq!(
        hex_key(ba),
        "0xaadb466868548500a92b93cfa0c280d1e59c0d3ed16042360d0f032b7f4d952a"
    );
}

#[test]
fn test_market_key_typed_matches() {
    let info = MarketKeyInfo {
        collateral_token_vault: addr_a(),
        index_token: addr_b(),
    };
    assert_eq!(
        info.key(),
        market_key(&[addr_a().into(), addr_b().into()]).unwrap()
    );
}

#[test]
fn test_position_key_vector() {
    let info = PositionKeyInfo {
        token_id: U256::from(7u64),
        collateral_token_vault: addr_a(),
        index_token: addr_b(),
        is_long: true,
        giant_token_id: U256::from(42u64),
    };
    assert_eq!(
        hex_key(info.key()),
        "0xfc84f607c1eac7559e09b641f60bedadbed9b6bd001401296d07aa399d3ea27f"
    );
}

#[test]
fn test_claimable_funding_key_vector() {
    let key = claimable_funding_key(&[
        addr_a().into(),
        addr_b().into(),
        AbiValue::from(1000u64),
    ])
    .unwrap();
    assert_eq!(
        hex_key(key),
        "0xf3d09005c5ca44ea4e701c2ef5afc7c5059c3f1a8a11e7b8c9d9561776733bf0"
    );
}

#[test]
fn test_vault_open_interest_key_vectors() {
    let long = vault_open_interest_key(&[addr_a().into(), AbiValue::Bool(true)]).unwrap();
    let short = vault_open_interest_key(&[addr_a().into(), AbiValue::Bool(false)]).unwrap();
    assert_eq!(
        hex_key(long),
        "0x8eec1c9afb183a84aac7003cf8e730bfb6385f6e43761d6425fba4265de3a9eb"
    );
    assert_eq!(
        hex_key(short),
        "0xf043c50fe795c69f30b8ff78b84032dc53a9d87ca283ae10a1dacfbb648e83ef"
    );
}

#[test]
fn test_execution_fee_key_vector() {
    assert_eq!(
        hex_key(execution_fee_key()),
        "0xaec69dd95fdcf12fe5f8fddaf3797cb5c08f44a936158de2b9ce0605515c6881"
    );
}

#[test]
fn test_execution_fee_encoding_layout() {
    let encoded = encode(
        &[ParamKind::String, ParamKind::String],
        &[AbiValue::from("CONFIG"), AbiValue::from("EXECUTION_FEE")],
    )
    .unwrap();
    let expected = concat!(
        "0000000000000000000000000000000000000000000000000000000000000040",
        "0000000000000000000000000000000000000000000000000000000000000080",
        "0000000000000000000000000000000000000000000000000000000000000006",
        "434f4e4649470000000000000000000000000000000000000000000000000000",
        "000000000000000000000000000000000000000000000000000000000000000d",
        "455845435554494f4e5f46454500000000000000000000000000000000000000",
    );
    assert_eq!(hex::encode(encoded), expected);
}

#[test]
fn test_wrong_types_fail_before_encoding() {
    // bool where an address is declared
    assert!(market_key(&[AbiValue::Bool(true), addr_b().into()]).is_err());
    // position key with the bool and uint swapped
    let swapped = [
        AbiValue::from(7u64),
        addr_a().into(),
        addr_b().into(),
        AbiValue::from(1u64),
        AbiValue::from(42u64),
    ];
    assert!(position_key(&swapped).is_err());
}

#[test]
fn test_key_kind_dispatch_matches_functions() {
    let values = [addr_a().into(), addr_b().into()];
    assert_eq!(
        KeyKind::Market.derive(&values).unwrap(),
        market_key(&values).unwrap()
    );
}
