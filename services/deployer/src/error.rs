//! Deployment errors
//!
//! `NetworkError` is what the network capability reports; `DeployError` is
//! what a deploy step reports. Every `DeployError` is fatal to a deployment
//! run: later steps may depend on the address that failed to appear.

use registry::RegistryError;
use thiserror::Error;

/// Failures reported by a `NetworkClient`
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("No artifact named '{name}' under {dir}")]
    ArtifactNotFound { name: String, dir: String },

    #[error("Artifact name '{name}' is ambiguous, use a fully qualified name: {}", .candidates.join(", "))]
    AmbiguousArtifact { name: String, candidates: Vec<String> },

    #[error("Invalid artifact {path}: {reason}")]
    InvalidArtifact { path: String, reason: String },

    #[error("Cannot link {contract}: {reason}")]
    Linking { contract: String, reason: String },

    #[error("Invalid constructor arguments for {contract}: {reason}")]
    ConstructorArgs { contract: String, reason: String },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction {tx_hash} not confirmed within {secs}s")]
    Timeout { tx_hash: String, secs: u64 },

    #[error("Transaction {tx_hash} was dropped from the mempool")]
    Dropped { tx_hash: String },

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("Receipt of {tx_hash} carries no contract address")]
    NoContractAddress { tx_hash: String },

    #[error("No contract code at {address}")]
    NoCode { address: String },
}

/// Failures of a deploy step
#[derive(Debug, Error)]
pub enum DeployError {
    /// The network rejected or never confirmed a deployment
    #[error("Deployment of '{label}' failed: {source}")]
    DeploymentFailure {
        label: String,
        #[source]
        source: NetworkError,
    },

    /// The registry holds an address the network cannot produce a handle for
    #[error("Cannot reconnect '{label}' at {address}: {source}")]
    ReconnectFailure {
        label: String,
        address: String,
        #[source]
        source: NetworkError,
    },

    #[error("Transaction '{label}' failed: {source}")]
    Transaction {
        label: String,
        #[source]
        source: NetworkError,
    },

    #[error("Chain query failed: {0}")]
    ChainQuery(#[source] NetworkError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Cannot load deploy plan {path}: {reason}")]
    PlanFile { path: String, reason: String },

    /// Deploy plan step cannot be turned into a contract spec
    #[error("Invalid deploy step '{step}': {reason}")]
    InvalidSpec { step: String, reason: String },
}
