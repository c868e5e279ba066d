//! File-backed address registry
//!
//! One JSON document per (network, chain id) at
//! `<root>/<network>/addresses/<chainId>.json`. Every write re-reads the
//! file and merges into it, so labels written by earlier runs survive.
//! Writes go to a temporary file in the same directory which then replaces
//! the document. Concurrent writers for the same chain are not coordinated.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use types::ChainInfo;

use crate::entry::{RegistryDocument, RegistryEntry};
use crate::error::RegistryError;

/// Where registry files live and which networks never persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub root: PathBuf,
    pub ephemeral_networks: BTreeSet<String>,
}

impl RegistryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ephemeral_networks: BTreeSet::new(),
        }
    }

    pub fn with_ephemeral(mut self, network: impl Into<String>) -> Self {
        self.ephemeral_networks.insert(network.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct AddressRegistry {
    config: RegistryConfig,
}

impl AddressRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn is_ephemeral(&self, network: &str) -> bool {
        self.config.ephemeral_networks.contains(network)
    }

    pub fn path_for(&self, network: &str, chain_id: u64) -> PathBuf {
        self.network_dir(network).join(format!("{}.json", chain_id))
    }

    fn network_dir(&self, network: &str) -> PathBuf {
        self.config.root.join(network).join("addresses")
    }

    /// Load the entry for (network, chain id), empty when nothing is persisted
    pub fn get(&self, network: &str, chain_id: u64) -> Result<RegistryEntry, RegistryError> {
        if self.is_ephemeral(network) {
            debug!(network, chain_id, "ephemeral network, starting with empty registry");
            return Ok(RegistryEntry::empty(network, chain_id));
        }

        let path = self.path_for(network, chain_id);
        match read_document(&path)? {
            Some(document) => {
                if let Some(info) = &document.chain_info {
                    if info.chain_id != chain_id {
                        warn!(
                            "Registry {:?} records chain id {} but is filed under {}",
                            path, info.chain_id, chain_id
                        );
                    }
                }
                debug!(
                    "Loaded {} addresses from {:?}",
                    document.addresses.len(),
                    path
                );
                Ok(RegistryEntry::from_document(network, chain_id, document))
            }
            None => Ok(RegistryEntry::empty(network, chain_id)),
        }
    }

    /// `file.addresses ∪ updates`, updates win
    ///
    /// Only `updates` are written; labels and chain info already in the
    /// file are kept as found there. `entry` is refreshed from the result.
    pub fn merge(
        &self,
        entry: &mut RegistryEntry,
        updates: BTreeMap<String, String>,
    ) -> Result<(), RegistryError> {
        let labels: Vec<String> = updates.keys().cloned().collect();

        if self.is_ephemeral(&entry.network) {
            entry.addresses.extend(updates);
            debug!(network = %entry.network, ?labels, "ephemeral network, registry write suppressed");
            return Ok(());
        }

        let path = self.path_for(&entry.network, entry.chain_id);
        let mut document = read_document(&path)?.unwrap_or_default();
        document.addresses.extend(updates);

        write_document(&path, &document)?;
        info!("📝 Recorded {:?} in {:?}", labels, path);

        entry.addresses = document.addresses;
        entry.chain_info = document.chain_info;
        Ok(())
    }

    /// Persist chain metadata, leaving recorded addresses untouched
    pub fn record_chain_info(
        &self,
        entry: &mut RegistryEntry,
        info: ChainInfo,
    ) -> Result<(), RegistryError> {
        entry.chain_info = Some(info.clone());

        if self.is_ephemeral(&entry.network) {
            debug!(network = %entry.network, "ephemeral network, chain info not persisted");
            return Ok(());
        }

        let path = self.path_for(&entry.network, entry.chain_id);
        let mut document = read_document(&path)?.unwrap_or_default();
        document.chain_info = Some(info);
        write_document(&path, &document)?;
        info!("📝 Recorded chain info in {:?}", path);

        for (label, address) in document.addresses {
            entry.addresses.entry(label).or_insert(address);
        }
        Ok(())
    }

    /// Delete the persisted entry; returns whether a file was removed
    pub fn reset(&self, network: &str, chain_id: u64) -> Result<bool, RegistryError> {
        if self.is_ephemeral(network) {
            return Ok(false);
        }

        let path = self.path_for(network, chain_id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("🗑️ Removed registry {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RegistryError::io(path, e)),
        }
    }

    /// Chain ids with a persisted registry file for `network`
    pub fn list(&self, network: &str) -> Result<Vec<u64>, RegistryError> {
        let dir = self.network_dir(network);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RegistryError::io(dir, e)),
        };

        let mut chain_ids = Vec::new();
        for dir_entry in entries {
            let path = dir_entry.map_err(|e| RegistryError::io(&dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(chain_id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u64>().ok())
            {
                chain_ids.push(chain_id);
            }
        }
        chain_ids.sort_unstable();
        Ok(chain_ids)
    }
}

fn read_document(path: &Path) -> Result<Option<RegistryDocument>, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RegistryError::io(path, e)),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| RegistryError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

fn write_document(path: &Path, document: &RegistryDocument) -> Result<(), RegistryError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| RegistryError::io(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| RegistryError::io(dir, e))?;
    let json = serde_json::to_string_pretty(document).map_err(|source| RegistryError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(json.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .map_err(|e| RegistryError::io(path, e))?;
    file.persist(path)
        .map_err(|e| RegistryError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAULT: &str = "0x1111111111111111111111111111111111111111";
    const ROUTER: &str = "0x2222222222222222222222222222222222222222";

    fn registry(root: &Path) -> AddressRegistry {
        AddressRegistry::new(RegistryConfig::new(root).with_ephemeral("localhost"))
    }

    fn updates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_path_layout() {
        let registry = registry(Path::new("env"));
        assert_eq!(
            registry.path_for("mainnet", 1),
            PathBuf::from("env/mainnet/addresses/1.json")
        );
    }

    #[test]
    fn test_get_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let entry = registry(dir.path()).get("mainnet", 1).unwrap();
        assert!(entry.is_empty());
        assert_eq!(entry.chain_info, None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());
        let path = registry.path_for("mainnet", 1);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            registry.get("mainnet", 1),
            Err(RegistryError::Corrupt { .. })
        ));
        // the file is left for inspection
        assert!(path.exists());
    }

    #[test]
    fn test_merge_preserves_labels_written_by_others() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        let mut first = registry.get("mainnet", 1).unwrap();
        let mut second = registry.get("mainnet", 1).unwrap();
        registry.merge(&mut first, updates(&[("Vault", VAULT)])).unwrap();
        registry.merge(&mut second, updates(&[("Router", ROUTER)])).unwrap();

        let reloaded = registry.get("mainnet", 1).unwrap();
        assert_eq!(reloaded.lookup("Vault"), Some(VAULT));
        assert_eq!(reloaded.lookup("Router"), Some(ROUTER));
        assert_eq!(second.lookup("Vault"), Some(VAULT));
    }

    #[test]
    fn test_chain_info_keeps_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        let mut entry = registry.get("mainnet", 1).unwrap();
        registry.merge(&mut entry, updates(&[("Vault", VAULT)])).unwrap();

        let mut fresh = RegistryEntry::empty("mainnet", 1);
        let info = ChainInfo {
            chain_id: 1,
            network: "mainnet".to_string(),
            start_block: 19_000_000,
            rpc: "https://mainnet.example/rpc".to_string(),
        };
        registry.record_chain_info(&mut fresh, info.clone()).unwrap();

        let reloaded = registry.get("mainnet", 1).unwrap();
        assert_eq!(reloaded.chain_info, Some(info));
        assert_eq!(reloaded.lookup("Vault"), Some(VAULT));
        assert_eq!(fresh.lookup("Vault"), Some(VAULT));
    }

    #[test]
    fn test_reset_removes_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        let mut entry = registry.get("mainnet", 1).unwrap();
        registry.merge(&mut entry, updates(&[("Vault", VAULT)])).unwrap();

        assert!(registry.reset("mainnet", 1).unwrap());
        assert!(!registry.reset("mainnet", 1).unwrap());
        assert!(registry.get("mainnet", 1).unwrap().is_empty());
    }

    #[test]
    fn test_ephemeral_network_never_touches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        let mut entry = registry.get("localhost", 31337).unwrap();
        registry.merge(&mut entry, updates(&[("Vault", VAULT)])).unwrap();
        registry
            .record_chain_info(
                &mut entry,
                ChainInfo {
                    chain_id: 31337,
                    network: "localhost".to_string(),
                    start_block: 0,
                    rpc: String::new(),
                },
            )
            .unwrap();

        // in-memory state still tracks the session
        assert_eq!(entry.lookup("Vault"), Some(VAULT));
        assert!(!registry.path_for("localhost", 31337).exists());
        assert!(!dir.path().join("localhost").exists());
    }

    #[test]
    fn test_ephemeral_get_ignores_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let persistent = AddressRegistry::new(RegistryConfig::new(dir.path()));
        let mut entry = persistent.get("localhost", 31337).unwrap();
        persistent.merge(&mut entry, updates(&[("Vault", VAULT)])).unwrap();

        let ephemeral = registry(dir.path());
        assert!(ephemeral.get("localhost", 31337).unwrap().is_empty());
    }

    #[test]
    fn test_list_chain_ids() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());
        assert!(registry.list("mainnet").unwrap().is_empty());

        for chain_id in [137u64, 1] {
            let mut entry = registry.get("mainnet", chain_id).unwrap();
            registry.merge(&mut entry, updates(&[("Vault", VAULT)])).unwrap();
        }
        assert_eq!(registry.list("mainnet").unwrap(), vec![1, 137]);
    }
}
