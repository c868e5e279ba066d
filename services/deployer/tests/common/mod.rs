//! In-memory network used by the deployer integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deployer::{NetworkClient, NetworkError, TxReceipt, TxRequest};
use registry::{AddressRegistry, RegistryConfig};
use types::{AbiValue, Address, ContractHandle, NetworkConfig, H256};

#[derive(Debug, Clone, PartialEq)]
pub struct DeployCall {
    pub name: String,
    pub args: Vec<AbiValue>,
    pub libraries: BTreeMap<String, Address>,
}

#[derive(Debug, Default)]
pub struct ChainState {
    pub next_address: u8,
    /// address -> contract type with code at that address
    pub code: BTreeMap<Address, String>,
    pub deploy_calls: Vec<DeployCall>,
    pub transactions: Vec<TxRequest>,
    pub block_number: u64,
    /// Contract types whose deployment never confirms
    pub failing: BTreeSet<String>,
    pub reject_transactions: bool,
}

/// Chain double; clones share state so a test can inspect it after handing
/// one clone to a `Deployer`
#[derive(Clone)]
pub struct MockNetwork {
    pub config: NetworkConfig,
    pub state: Arc<Mutex<ChainState>>,
}

impl MockNetwork {
    pub fn new(chain_id: u64) -> Self {
        Self {
            config: NetworkConfig {
                chain_id,
                url: format!("http://mock-{}.invalid", chain_id),
            },
            state: Arc::new(Mutex::new(ChainState {
                next_address: 1,
                block_number: 1_000,
                ..ChainState::default()
            })),
        }
    }

    pub fn fail_deployments_of(&self, name: &str) {
        self.state.lock().unwrap().failing.insert(name.to_string());
    }

    pub fn allow_deployments_of(&self, name: &str) {
        self.state.lock().unwrap().failing.remove(name);
    }

    pub fn deploy_calls(&self) -> Vec<DeployCall> {
        self.state.lock().unwrap().deploy_calls.clone()
    }

    pub fn set_code(&self, address: Address, name: &str) {
        self.state
            .lock()
            .unwrap()
            .code
            .insert(address, name.to_string());
    }
}

#[async_trait]
impl NetworkClient for MockNetwork {
    type Pending = (String, Address);

    async fn deploy_contract(
        &self,
        name: &str,
        args: &[AbiValue],
        libraries: &BTreeMap<String, Address>,
    ) -> Result<(String, Address), NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.deploy_calls.push(DeployCall {
            name: name.to_string(),
            args: args.to_vec(),
            libraries: libraries.clone(),
        });
        let address = Address::repeat_byte(0xc0 ^ state.next_address);
        state.next_address += 1;
        Ok((name.to_string(), address))
    }

    async fn await_deployment(
        &self,
        pending: (String, Address),
    ) -> Result<ContractHandle, NetworkError> {
        let (name, address) = pending;
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(&name) {
            return Err(NetworkError::Reverted {
                tx_hash: format!("{:#x}", H256::repeat_byte(0xee)),
            });
        }
        state.block_number += 1;
        state.code.insert(address, name.clone());
        Ok(ContractHandle::new(name, address))
    }

    async fn get_contract_at(
        &self,
        name: &str,
        address: Address,
    ) -> Result<ContractHandle, NetworkError> {
        let state = self.state.lock().unwrap();
        if !state.code.contains_key(&address) {
            return Err(NetworkError::NoCode {
                address: types::format_address(&address),
            });
        }
        Ok(ContractHandle::new(name, address))
    }

    async fn get_block_number(&self) -> Result<u64, NetworkError> {
        Ok(self.state.lock().unwrap().block_number)
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<H256, NetworkError> {
        let mut state = self.state.lock().unwrap();
        if state.reject_transactions {
            return Err(NetworkError::Rpc("nonce too low".to_string()));
        }
        state.transactions.push(tx);
        Ok(H256::from_low_u64_be(state.transactions.len() as u64))
    }

    async fn wait_for_transaction(&self, tx_hash: H256) -> Result<TxReceipt, NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.block_number += 1;
        Ok(TxReceipt {
            tx_hash,
            block_number: state.block_number,
        })
    }

    fn network_config(&self) -> NetworkConfig {
        self.config.clone()
    }
}

pub fn registry(root: &Path) -> AddressRegistry {
    AddressRegistry::new(RegistryConfig::new(root).with_ephemeral("localhost"))
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
