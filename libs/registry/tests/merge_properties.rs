//! Property tests for registry merge semantics

use std::collections::BTreeMap;

use proptest::prelude::*;
use registry::{AddressRegistry, RegistryConfig};

fn arb_updates() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[A-Z][a-z]{0,3}", "0x[0-9a-f]{40}", 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// merge(merge(e, A), B) == merge(e, A ∪ B) with B winning on overlap
    #[test]
    fn merge_is_associative(a in arb_updates(), b in arb_updates()) {
        let dir = tempfile::tempdir().unwrap();
        let registry = AddressRegistry::new(RegistryConfig::new(dir.path()));

        let mut stepwise = registry.get("stepwise", 1).unwrap();
        registry.merge(&mut stepwise, a.clone()).unwrap();
        registry.merge(&mut stepwise, b.clone()).unwrap();

        let mut union = a.clone();
        union.extend(b.clone());
        let mut combined = registry.get("combined", 1).unwrap();
        registry.merge(&mut combined, union.clone()).unwrap();

        let persisted_stepwise = registry.get("stepwise", 1).unwrap();
        let persisted_combined = registry.get("combined", 1).unwrap();
        prop_assert_eq!(&persisted_stepwise.addresses, &persisted_combined.addresses);
        prop_assert_eq!(&persisted_stepwise.addresses, &union);
        prop_assert_eq!(&stepwise.addresses, &union);

        for (label, address) in &b {
            prop_assert_eq!(persisted_stepwise.lookup(label), Some(address.as_str()));
        }
    }

    /// Labels never disappear across merges
    #[test]
    fn merge_is_non_destructive(a in arb_updates(), b in arb_updates()) {
        let dir = tempfile::tempdir().unwrap();
        let registry = AddressRegistry::new(RegistryConfig::new(dir.path()));

        let mut entry = registry.get("mainnet", 1).unwrap();
        registry.merge(&mut entry, a.clone()).unwrap();
        let mut other = registry.get("mainnet", 1).unwrap();
        registry.merge(&mut other, b).unwrap();

        let reloaded = registry.get("mainnet", 1).unwrap();
        for label in a.keys() {
            prop_assert!(reloaded.lookup(label).is_some());
        }
    }
}

const OLD_VAULT: &str = "0x1111111111111111111111111111111111111111";
const NEW_VAULT: &str = "0x2222222222222222222222222222222222222222";
const ROUTER: &str = "0x3333333333333333333333333333333333333333";

fn single(label: &str, address: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(label.to_string(), address.to_string())])
}

#[test]
fn test_stale_entry_does_not_revert_newer_labels() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AddressRegistry::new(RegistryConfig::new(dir.path()));

    let mut early = registry.get("mainnet", 1).unwrap();
    registry.merge(&mut early, single("Vault", OLD_VAULT)).unwrap();

    let mut late = registry.get("mainnet", 1).unwrap();
    registry.merge(&mut late, single("Vault", NEW_VAULT)).unwrap();

    registry.merge(&mut early, single("Router", ROUTER)).unwrap();

    let persisted = registry.get("mainnet", 1).unwrap();
    assert_eq!(persisted.lookup("Vault"), Some(NEW_VAULT));
    assert_eq!(persisted.lookup("Router"), Some(ROUTER));
    assert_eq!(early.lookup("Vault"), Some(NEW_VAULT));
}

#[test]
fn test_merge_keeps_chain_info_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AddressRegistry::new(RegistryConfig::new(dir.path()));

    let mut stale = registry.get("mainnet", 1).unwrap();
    let mut writer = registry.get("mainnet", 1).unwrap();
    let info = types::ChainInfo {
        chain_id: 1,
        network: "mainnet".to_string(),
        start_block: 17_000_000,
        rpc: "https://rpc.invalid".to_string(),
    };
    registry.record_chain_info(&mut writer, info.clone()).unwrap();

    registry.merge(&mut stale, single("Router", ROUTER)).unwrap();

    let persisted = registry.get("mainnet", 1).unwrap();
    assert_eq!(persisted.chain_info, Some(info.clone()));
    assert_eq!(stale.chain_info, Some(info));
}
