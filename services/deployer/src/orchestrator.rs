//! Idempotent deploy orchestrator
//!
//! For each contract spec: reconnect to the address the registry holds under
//! its label, or deploy and record the new address. The registry entry for
//! the active (network, chain id) is loaded on first use and kept for the
//! life of the `Deployer`.

use std::collections::BTreeMap;
use std::fmt;

use registry::{AddressRegistry, RegistryEntry, RegistryError};
use tracing::{debug, error, info};
use types::{format_address, Address, ChainInfo, ContractHandle, ContractSpec};

use crate::error::{DeployError, NetworkError};
use crate::network::{NetworkClient, TxReceipt, TxRequest};

/// Lifecycle of one deploy step
///
/// `Pending -> Connected` when a recorded address is reachable,
/// `Pending -> Deployed` after a confirmed deployment, `Pending -> Failed`
/// otherwise. All three outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Pending,
    Connected,
    Deployed,
    Failed,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            DeployState::Pending => "pending",
            DeployState::Connected => "connected",
            DeployState::Deployed => "deployed",
            DeployState::Failed => "failed",
        };
        f.write_str(state)
    }
}

/// Result of a successful deploy step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub label: String,
    pub handle: ContractHandle,
    pub state: DeployState,
}

impl Deployment {
    pub fn address(&self) -> Address {
        self.handle.address
    }
}

pub struct Deployer<N: NetworkClient> {
    network: N,
    registry: AddressRegistry,
    network_name: String,
    chain_id: u64,
    entry: Option<RegistryEntry>,
    deployments_performed: usize,
}

impl<N: NetworkClient> Deployer<N> {
    pub fn new(network: N, registry: AddressRegistry, network_name: impl Into<String>) -> Self {
        let chain_id = network.network_config().chain_id;
        Self {
            network,
            registry,
            network_name: network_name.into(),
            chain_id,
            entry: None,
            deployments_performed: 0,
        }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_ephemeral(&self) -> bool {
        self.registry.is_ephemeral(&self.network_name)
    }

    /// Deployments that reached the network during this session
    pub fn deployments_performed(&self) -> usize {
        self.deployments_performed
    }

    /// Registry entry for the active chain, loaded on first use
    pub fn entry(&mut self) -> Result<&RegistryEntry, DeployError> {
        let entry = load_entry(
            &mut self.entry,
            &self.registry,
            &self.network_name,
            self.chain_id,
        )?;
        Ok(&*entry)
    }

    /// Address recorded under `label`, including this session's deployments
    pub fn address_of(&mut self, label: &str) -> Result<Option<Address>, DeployError> {
        Ok(self.entry()?.lookup_address(label)?)
    }

    /// Connect to the recorded instance of `spec`, or deploy and record it
    ///
    /// On persistent networks a label that is already recorded is never
    /// redeployed; if the network cannot produce a handle for the recorded
    /// address the step fails with `ReconnectFailure`. On ephemeral networks
    /// every call deploys.
    pub async fn deploy_or_connect(
        &mut self,
        spec: &ContractSpec,
    ) -> Result<Deployment, DeployError> {
        let label = spec.key().to_string();
        debug!(label = %label, state = %DeployState::Pending, "deploy step");

        if !self.is_ephemeral() {
            if let Some(handle) = self.reconnect(spec).await? {
                info!("Connecting to {} at {}", label, format_address(&handle.address));
                debug!(label = %label, state = %DeployState::Connected, "deploy step");
                return Ok(Deployment {
                    label,
                    handle,
                    state: DeployState::Connected,
                });
            }
        }

        info!("=====Deploying {}=====", label);
        let handle = self.deploy(spec, &label).await?;
        self.deployments_performed += 1;
        info!("🚀 Deployed {} to {}", label, format_address(&handle.address));

        let entry = load_entry(
            &mut self.entry,
            &self.registry,
            &self.network_name,
            self.chain_id,
        )?;
        let updates = BTreeMap::from([(label.clone(), format_address(&handle.address))]);
        self.registry.merge(entry, updates)?;

        debug!(label = %label, state = %DeployState::Deployed, "deploy step");
        Ok(Deployment {
            label,
            handle,
            state: DeployState::Deployed,
        })
    }

    /// Handle to the recorded instance of `spec`, `None` when nothing is recorded
    pub async fn connect(
        &mut self,
        spec: &ContractSpec,
    ) -> Result<Option<ContractHandle>, DeployError> {
        self.reconnect(spec).await
    }

    async fn reconnect(
        &mut self,
        spec: &ContractSpec,
    ) -> Result<Option<ContractHandle>, DeployError> {
        let label = spec.key();
        let address = match self.address_of(label)? {
            Some(address) => address,
            None => return Ok(None),
        };

        match self.network.get_contract_at(&spec.name, address).await {
            Ok(handle) => Ok(Some(handle)),
            Err(source) => {
                error!(
                    "🛑 Cannot reconnect {} at {}: {}",
                    label,
                    format_address(&address),
                    source
                );
                debug!(label = %label, state = %DeployState::Failed, "deploy step");
                Err(DeployError::ReconnectFailure {
                    label: label.to_string(),
                    address: format_address(&address),
                    source,
                })
            }
        }
    }

    async fn deploy(
        &self,
        spec: &ContractSpec,
        label: &str,
    ) -> Result<ContractHandle, DeployError> {
        let submitted = self
            .network
            .deploy_contract(&spec.name, &spec.args, &spec.libraries)
            .await;
        let result = match submitted {
            Ok(pending) => self.network.await_deployment(pending).await,
            Err(e) => Err(e),
        };

        result.map_err(|source| deployment_failure(label, source))
    }

    /// Record `{chainId, network, startBlock, rpc}` for the active chain
    ///
    /// `startBlock` is the chain height at the time of the call.
    pub async fn write_chain_info(&mut self) -> Result<ChainInfo, DeployError> {
        let start_block = self
            .network
            .get_block_number()
            .await
            .map_err(DeployError::ChainQuery)?;
        let config = self.network.network_config();
        let info = ChainInfo {
            chain_id: config.chain_id,
            network: self.network_name.clone(),
            start_block,
            rpc: config.url,
        };

        let entry = load_entry(
            &mut self.entry,
            &self.registry,
            &self.network_name,
            self.chain_id,
        )?;
        self.registry.record_chain_info(entry, info.clone())?;
        info!("⛓️ Chain {} starts at block {}", info.chain_id, info.start_block);
        Ok(info)
    }

    /// Forget every recorded address for the active chain
    pub fn reset(&mut self) -> Result<bool, DeployError> {
        self.entry = None;
        Ok(self.registry.reset(&self.network_name, self.chain_id)?)
    }

    /// Submit a transaction and wait for it, reporting the outcome
    pub async fn handle_tx(&self, label: &str, tx: TxRequest) -> Result<TxReceipt, DeployError> {
        info!("====={}=====", label);
        let tx_hash = self
            .network
            .send_transaction(tx)
            .await
            .map_err(|source| transaction_failure(label, source))?;
        info!("Tx hash: {:#x}", tx_hash);

        let receipt = self
            .network
            .wait_for_transaction(tx_hash)
            .await
            .map_err(|source| transaction_failure(label, source))?;
        info!("Tx mined in block {}", receipt.block_number);
        info!("✨ {} success!", label);
        Ok(receipt)
    }
}

fn load_entry<'a>(
    slot: &'a mut Option<RegistryEntry>,
    registry: &AddressRegistry,
    network: &str,
    chain_id: u64,
) -> Result<&'a mut RegistryEntry, RegistryError> {
    let entry = match slot.take() {
        Some(entry) => entry,
        None => registry.get(network, chain_id)?,
    };
    Ok(slot.insert(entry))
}

fn deployment_failure(label: &str, source: NetworkError) -> DeployError {
    error!("🛑 Deployment of {} failed: {}", label, source);
    debug!(label = %label, state = %DeployState::Failed, "deploy step");
    DeployError::DeploymentFailure {
        label: label.to_string(),
        source,
    }
}

fn transaction_failure(label: &str, source: NetworkError) -> DeployError {
    error!("🛑 {} failed: {}", label, source);
    DeployError::Transaction {
        label: label.to_string(),
        source,
    }
}
