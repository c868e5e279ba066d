//! JSON-RPC backed network client
//!
//! Signs with a local key, submits EIP-1559 transactions and polls for
//! receipts until the configured number of confirmations is reached.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Bytes, Eip1559TransactionRequest, TransactionReceipt};
use tracing::{debug, info, warn};
use types::{format_address, AbiValue, Address, ContractHandle, NetworkConfig, H256};
use url::Url;

use crate::artifact::ArtifactStore;
use crate::error::NetworkError;
use crate::network::{NetworkClient, TxReceipt, TxRequest};

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Connection and confirmation policy for `EthersClient`
#[derive(Debug, Clone)]
pub struct EthersClientConfig {
    pub rpc_url: String,
    /// Expected chain id, checked against the node when set
    pub chain_id: Option<u64>,
    pub private_key: String,
    pub artifacts_dir: PathBuf,
    pub confirmations: usize,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
}

/// Submitted contract creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeployment {
    pub name: String,
    pub tx_hash: H256,
}

pub struct EthersClient {
    client: Arc<Client>,
    artifacts: ArtifactStore,
    network: NetworkConfig,
    confirmations: usize,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl EthersClient {
    pub async fn connect(config: EthersClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let url: Url = config.rpc_url.parse().context("Invalid RPC URL")?;
        let provider = Provider::<Http>::new(Http::new_with_client(url, http_client))
            .interval(config.poll_interval);

        let chain_id = provider
            .get_chainid()
            .await
            .context("Failed to query chain id")?
            .as_u64();
        if let Some(expected) = config.chain_id {
            if expected != chain_id {
                bail!(
                    "Node at {} reports chain id {}, configuration expects {}",
                    config.rpc_url,
                    chain_id,
                    expected
                );
            }
        }

        let wallet = config
            .private_key
            .parse::<LocalWallet>()
            .context("Invalid private key format")?
            .with_chain_id(chain_id);

        info!("✅ Connected to chain {} via {}", chain_id, config.rpc_url);
        info!("   - Deployer: {}", format_address(&wallet.address()));
        info!("   - Confirmations: {}", config.confirmations);

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            artifacts: ArtifactStore::new(config.artifacts_dir),
            network: NetworkConfig {
                chain_id,
                url: config.rpc_url,
            },
            confirmations: config.confirmations.max(1),
            confirmation_timeout: config.confirmation_timeout,
            poll_interval: config.poll_interval,
        })
    }

    pub fn deployer_address(&self) -> Address {
        self.client.address()
    }

    async fn submit(&self, tx: Eip1559TransactionRequest) -> Result<H256, NetworkError> {
        let tx: TypedTransaction = tx.into();
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| NetworkError::Rpc(e.to_string()))?;
        Ok(pending.tx_hash())
    }

    /// Poll for a receipt, then for enough blocks on top of it
    async fn monitor_confirmation(&self, tx_hash: H256) -> Result<TransactionReceipt, NetworkError> {
        debug!("⏳ Monitoring confirmation for tx: {:#x}", tx_hash);
        let start_time = Instant::now();

        let receipt = loop {
            if start_time.elapsed() > self.confirmation_timeout {
                return Err(NetworkError::Timeout {
                    tx_hash: format!("{:#x}", tx_hash),
                    secs: self.confirmation_timeout.as_secs(),
                });
            }

            match self.client.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.block_number.is_some() => break receipt,
                Ok(_) => {}
                Err(e) => warn!("Error checking transaction receipt: {}", e),
            }
            tokio::time::sleep(self.poll_interval).await;
        };

        if receipt.status.map(|status| status.is_zero()).unwrap_or(false) {
            return Err(NetworkError::Reverted {
                tx_hash: format!("{:#x}", tx_hash),
            });
        }

        let mined_in = receipt.block_number.map(|n| n.as_u64()).unwrap_or_default();
        let target = mined_in + self.confirmations as u64 - 1;
        while self.get_block_number().await? < target {
            if start_time.elapsed() > self.confirmation_timeout {
                return Err(NetworkError::Timeout {
                    tx_hash: format!("{:#x}", tx_hash),
                    secs: self.confirmation_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        info!("✅ Transaction confirmed in block {}: {:#x}", mined_in, tx_hash);
        Ok(receipt)
    }
}

#[async_trait]
impl NetworkClient for EthersClient {
    type Pending = PendingDeployment;

    async fn deploy_contract(
        &self,
        name: &str,
        args: &[AbiValue],
        libraries: &BTreeMap<String, Address>,
    ) -> Result<PendingDeployment, NetworkError> {
        let artifact = self.artifacts.load(name)?;
        let bytecode = artifact.link(libraries)?;
        let tokens: Vec<_> = args.iter().map(codec::to_token).collect();

        let data = match artifact.abi.constructor() {
            Some(constructor) => constructor.encode_input(bytecode, &tokens).map_err(|e| {
                NetworkError::ConstructorArgs {
                    contract: name.to_string(),
                    reason: e.to_string(),
                }
            })?,
            None if tokens.is_empty() => bytecode,
            None => {
                return Err(NetworkError::ConstructorArgs {
                    contract: name.to_string(),
                    reason: format!("no constructor, but {} arguments given", tokens.len()),
                })
            }
        };

        let tx = Eip1559TransactionRequest::new().data(Bytes::from(data));
        let tx_hash = self.submit(tx).await?;
        debug!("{} creation submitted: {:#x}", name, tx_hash);

        Ok(PendingDeployment {
            name: name.to_string(),
            tx_hash,
        })
    }

    async fn await_deployment(
        &self,
        pending: PendingDeployment,
    ) -> Result<ContractHandle, NetworkError> {
        let receipt = self.monitor_confirmation(pending.tx_hash).await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| NetworkError::NoContractAddress {
                tx_hash: format!("{:#x}", pending.tx_hash),
            })?;
        Ok(ContractHandle::new(pending.name, address))
    }

    async fn get_contract_at(
        &self,
        name: &str,
        address: Address,
    ) -> Result<ContractHandle, NetworkError> {
        let code = self
            .client
            .get_code(address, None)
            .await
            .map_err(|e| NetworkError::Rpc(e.to_string()))?;
        if code.as_ref().is_empty() {
            return Err(NetworkError::NoCode {
                address: format_address(&address),
            });
        }
        Ok(ContractHandle::new(name, address))
    }

    async fn get_block_number(&self) -> Result<u64, NetworkError> {
        self.client
            .get_block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| NetworkError::Rpc(e.to_string()))
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<H256, NetworkError> {
        let request = Eip1559TransactionRequest::new()
            .to(tx.to)
            .data(Bytes::from(tx.data))
            .value(tx.value);
        self.submit(request).await
    }

    async fn wait_for_transaction(&self, tx_hash: H256) -> Result<TxReceipt, NetworkError> {
        let receipt = self.monitor_confirmation(tx_hash).await?;
        Ok(TxReceipt {
            tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()).unwrap_or_default(),
        })
    }

    fn network_config(&self) -> NetworkConfig {
        self.network.clone()
    }
}
