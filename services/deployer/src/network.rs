//! Network capability
//!
//! Everything the orchestrator needs from a chain, behind one trait so the
//! orchestrator can run against a live node or an in-memory double.

use std::collections::BTreeMap;

use async_trait::async_trait;
use types::{AbiValue, Address, ContractHandle, NetworkConfig, H256, U256};

use crate::error::NetworkError;

/// A plain transaction to an existing contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub to: Address,
    pub data: Vec<u8>,
    pub value: U256,
}

impl TxRequest {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            data,
            value: U256::zero(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Outcome of a confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: H256,
    pub block_number: u64,
}

#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Submitted but not yet confirmed deployment
    type Pending: Send;

    /// Submit a deployment of contract type `name`
    async fn deploy_contract(
        &self,
        name: &str,
        args: &[AbiValue],
        libraries: &BTreeMap<String, Address>,
    ) -> Result<Self::Pending, NetworkError>;

    /// Wait until a submitted deployment is confirmed
    async fn await_deployment(&self, pending: Self::Pending)
        -> Result<ContractHandle, NetworkError>;

    /// Handle to an already deployed instance of contract type `name`
    async fn get_contract_at(
        &self,
        name: &str,
        address: Address,
    ) -> Result<ContractHandle, NetworkError>;

    async fn get_block_number(&self) -> Result<u64, NetworkError>;

    async fn send_transaction(&self, tx: TxRequest) -> Result<H256, NetworkError>;

    async fn wait_for_transaction(&self, tx_hash: H256) -> Result<TxReceipt, NetworkError>;

    fn network_config(&self) -> NetworkConfig;
}
