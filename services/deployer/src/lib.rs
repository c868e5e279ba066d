//! # Deployer Service
//!
//! ## Purpose
//!
//! Idempotent contract deployment against a per-network address registry:
//! a contract already recorded under its label is reconnected, anything
//! else is deployed, confirmed and recorded before the next step runs.
//!
//! ## Architecture Role
//!
//! ```text
//! deploy plan (TOML) → [Deployer] → NetworkClient → JSON-RPC node
//!                          ↓
//!                   AddressRegistry → <root>/<network>/addresses/<chainId>.json
//! ```
//!
//! ## Failure Policy
//!
//! Every error ends the run. Addresses recorded before the failure stay
//! recorded, so a rerun resumes at the failed step.

pub mod artifact;
pub mod error;
pub mod ethers_client;
pub mod network;
pub mod orchestrator;
pub mod plan;

pub use artifact::{Artifact, ArtifactStore};
pub use error::{DeployError, NetworkError};
pub use ethers_client::{EthersClient, EthersClientConfig, PendingDeployment};
pub use network::{NetworkClient, TxReceipt, TxRequest};
pub use orchestrator::{DeployState, Deployer, Deployment};
pub use plan::{DeployPlan, PlanArg, PlanStep};
