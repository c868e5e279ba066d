//! Deployment descriptors and chain metadata

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AbiValue, Address};

/// What to deploy: contract type, constructor arguments, link-time libraries
///
/// Immutable per deploy call. The registry key is `label` when set,
/// otherwise the contract type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub name: String,
    pub args: Vec<AbiValue>,
    pub label: Option<String>,
    pub libraries: BTreeMap<String, Address>,
}

impl ContractSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            label: None,
            libraries: BTreeMap::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<AbiValue>) -> Self {
        self.args = args;
        self
    }

    pub fn with_arg(mut self, arg: impl Into<AbiValue>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_library(mut self, name: impl Into<String>, address: Address) -> Self {
        self.libraries.insert(name.into(), address);
        self
    }

    /// Registry key for this deployment
    pub fn key(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Reference to a live contract instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    pub name: String,
    pub address: Address,
}

impl ContractHandle {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

/// Chain metadata persisted alongside deployed addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: u64,
    pub network: String,
    pub start_block: u64,
    /// Absent for networks without a configured endpoint
    #[serde(default)]
    pub rpc: String,
}

/// Connection parameters reported by the active network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub url: String,
}
