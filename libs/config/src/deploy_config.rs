//! Deployer Configuration Module
//!
//! Provides configuration loading for the deployment tooling.
//! Supports loading from a TOML file with environment overrides.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::defaults;

/// Main deployer configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeployerConfig {
    /// Address registry location
    pub registry: RegistrySettings,

    /// Compiled contract artifacts
    pub artifacts: ArtifactSettings,

    /// Deployment confirmation policy
    pub deploy: DeploySettings,

    /// Known networks by name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkSettings>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistrySettings {
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ArtifactSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeploySettings {
    pub confirmations: usize,
    pub confirmation_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

/// Individual network settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NetworkSettings {
    /// JSON-RPC endpoint, `${VAR}` references are expanded
    pub url: String,

    /// Expected chain id; queried from the node when absent
    pub chain_id: Option<u64>,

    /// Registry state for this network is never persisted
    #[serde(default)]
    pub ephemeral: bool,

    pub description: Option<String>,
}

impl DeployerConfig {
    /// Load configuration from file with environment overrides
    pub fn load(base_path: Option<&Path>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(defaults::CONFIG_PATH));
        let required = base_path.is_some();

        if base.exists() {
            info!("Loading deployer config: {:?}", base);
        } else {
            debug!("Deployer config not found at {:?}, using defaults", base);
        }

        let builder = Config::builder()
            .set_default("registry.root", defaults::REGISTRY_ROOT)?
            .set_default("artifacts.dir", defaults::ARTIFACTS_DIR)?
            .set_default("deploy.confirmations", defaults::CONFIRMATIONS as u64)?
            .set_default(
                "deploy.confirmation_timeout_secs",
                defaults::CONFIRMATION_TIMEOUT_SECS,
            )?
            .set_default("deploy.poll_interval_ms", defaults::POLL_INTERVAL_MS)?
            .set_default("networks.localhost.url", defaults::LOCALHOST_URL)?
            .set_default("networks.localhost.chain_id", defaults::LOCAL_CHAIN_ID)?
            .set_default("networks.localhost.ephemeral", true)?
            .add_source(File::from(base).required(required))
            // Override with environment variables (DEPLOYER__ prefix)
            .add_source(
                Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator(defaults::ENV_SEPARATOR)
                    .separator(defaults::ENV_SEPARATOR)
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Get settings for a specific network
    pub fn network(&self, name: &str) -> Result<&NetworkSettings> {
        match self.networks.get(name) {
            Some(settings) => Ok(settings),
            None => bail!(
                "Unknown network '{}', configured networks: {}",
                name,
                self.networks.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    /// Names of networks whose registry state is never persisted
    pub fn ephemeral_networks(&self) -> Vec<String> {
        self.networks
            .iter()
            .filter(|(_, settings)| settings.ephemeral)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Expand environment variables in RPC URLs
    ///
    /// A URL naming an unset variable is left as written; only using that
    /// network is an error, see `rpc_url`.
    pub fn expand_env_vars(&mut self) {
        for (name, network) in &mut self.networks {
            match shellexpand::env(&network.url) {
                Ok(expanded) => network.url = expanded.to_string(),
                Err(e) => debug!("RPC URL of network '{}' not expanded: {}", name, e),
            }
        }
    }

    /// Expanded RPC URL of a network
    pub fn rpc_url(&self, name: &str) -> Result<&str> {
        let url = self.network(name)?.url.as_str();
        if let Some(start) = url.find("${") {
            let var = url[start + 2..].split('}').next().unwrap_or_default();
            bail!(
                "RPC URL of network '{}' needs environment variable {}",
                name,
                var
            );
        }
        Ok(url)
    }
}

/// Convenience function to load configuration with expanded URLs
pub fn load_config(path: Option<&Path>) -> Result<DeployerConfig> {
    let mut config = DeployerConfig::load(path)?;
    config.expand_env_vars();
    Ok(config)
}
