//! # Deployment Configuration
//!
//! Centralized configuration for the deployment tooling: which networks
//! exist, where their registry files live, where compiled artifacts are
//! found, and how long to wait for deployments to confirm.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use deploy_config::load_config;
//!
//! let config = load_config(None).unwrap();
//! let mainnet = config.network("mainnet").unwrap();
//! assert!(!mainnet.ephemeral);
//! ```

pub mod defaults;
pub mod deploy_config;

// Re-export commonly used types
pub use deploy_config::{
    load_config, ArtifactSettings, DeploySettings, DeployerConfig, NetworkSettings,
    RegistrySettings,
};
