//! Registry entries and their on-disk document

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use types::{parse_address, Address, ChainInfo};

use crate::error::RegistryError;

/// Addresses and chain metadata of one (network, chain id) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub network: String,
    pub chain_id: u64,
    pub chain_info: Option<ChainInfo>,
    /// Label → deployed address, unique per label
    pub addresses: BTreeMap<String, String>,
}

impl RegistryEntry {
    pub fn empty(network: impl Into<String>, chain_id: u64) -> Self {
        Self {
            network: network.into(),
            chain_id,
            chain_info: None,
            addresses: BTreeMap::new(),
        }
    }

    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.addresses.get(label).map(String::as_str)
    }

    /// Recorded address for `label`, parsed
    pub fn lookup_address(&self, label: &str) -> Result<Option<Address>, RegistryError> {
        match self.lookup(label) {
            None => Ok(None),
            Some(text) => parse_address(text)
                .map(Some)
                .map_err(|_| RegistryError::InvalidAddress {
                    network: self.network.clone(),
                    chain_id: self.chain_id,
                    label: label.to_string(),
                    address: text.to_string(),
                }),
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub(crate) fn from_document(network: &str, chain_id: u64, document: RegistryDocument) -> Self {
        Self {
            network: network.to_string(),
            chain_id,
            chain_info: document.chain_info,
            addresses: document.addresses,
        }
    }
}

/// File shape: `{ "chainInfo": {...}, "addresses": { label: address } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct RegistryDocument {
    #[serde(rename = "chainInfo", default, with = "chain_info_object")]
    pub chain_info: Option<ChainInfo>,
    #[serde(default)]
    pub addresses: BTreeMap<String, String>,
}

/// Missing chain info is stored as `{}`
mod chain_info_object {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::{Map, Value};
    use types::ChainInfo;

    pub fn serialize<S: Serializer>(value: &Option<ChainInfo>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(info) => info.serialize(serializer),
            None => Map::new().serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ChainInfo>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            _ => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
        }
    }
}
