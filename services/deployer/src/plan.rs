//! Declarative deploy plans
//!
//! A plan is a TOML file listing contracts in deployment order. Arguments
//! and library addresses may refer to the label of an earlier step, which
//! resolves to whatever address the registry holds for it at that point.
//!
//! ```toml
//! write_chain_info = true
//!
//! [[contracts]]
//! name = "TokenValidator"
//! args = [
//!     { type = "address", value = "0x1F98431c8aD98523631AE4a59f267346ea31F984" },
//!     { type = "address", value = "0xC36442b4a4522E871399CD717aBDD847Ab11FE88" },
//! ]
//!
//! [[contracts]]
//! name = "Vault"
//! args = [{ type = "ref", label = "TokenValidator" }]
//! libraries = { PositionMath = "PositionMath" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;
use types::units::parse_units;
use types::{parse_address, parse_uint, AbiValue, Address, ContractSpec, U256};

use crate::error::DeployError;
use crate::network::NetworkClient;
use crate::orchestrator::{DeployState, Deployer, Deployment};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployPlan {
    /// Record chain metadata before the first step
    #[serde(default = "default_true")]
    pub write_chain_info: bool,

    #[serde(default)]
    pub contracts: Vec<PlanStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanStep {
    pub name: String,
    pub label: Option<String>,
    #[serde(default)]
    pub args: Vec<PlanArg>,
    /// Library name -> address or label of an earlier step
    #[serde(default)]
    pub libraries: BTreeMap<String, String>,
}

impl PlanStep {
    pub fn key(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Build the contract spec, resolving labels through `resolve`
    pub fn to_spec<F>(&self, mut resolve: F) -> Result<ContractSpec, DeployError>
    where
        F: FnMut(&str) -> Result<Option<Address>, DeployError>,
    {
        let invalid = |reason: String| DeployError::InvalidSpec {
            step: self.key().to_string(),
            reason,
        };

        let mut args = Vec::with_capacity(self.args.len());
        for (position, arg) in self.args.iter().enumerate() {
            let value = arg
                .resolve(&mut resolve)?
                .map_err(|reason| invalid(format!("argument {}: {}", position, reason)))?;
            args.push(value);
        }

        let mut spec = ContractSpec::new(&self.name).with_args(args);
        if let Some(label) = &self.label {
            spec = spec.with_label(label);
        }

        for (library, target) in &self.libraries {
            let address = match parse_address(target) {
                Ok(address) => address,
                Err(_) => resolve(target)?.ok_or_else(|| {
                    invalid(format!("library {} refers to unknown label '{}'", library, target))
                })?,
            };
            spec = spec.with_library(library, address);
        }

        Ok(spec)
    }
}

/// Uint literal: TOML integer, or decimal / `0x` hex text for wide values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UintLiteral {
    Number(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlanArg {
    Uint {
        value: UintLiteral,
        /// Scale a decimal amount by `10^decimals`
        decimals: Option<u32>,
    },
    Bool {
        value: bool,
    },
    Address {
        value: String,
    },
    String {
        value: String,
    },
    Bytes {
        value: String,
    },
    /// Address recorded under the label of an earlier step
    Ref {
        label: String,
    },
    Tuple {
        items: Vec<PlanArg>,
    },
}

impl PlanArg {
    /// Outer error aborts the run, inner error rejects this argument
    fn resolve<F>(&self, resolve: &mut F) -> Result<Result<AbiValue, String>, DeployError>
    where
        F: FnMut(&str) -> Result<Option<Address>, DeployError>,
    {
        let value = match self {
            PlanArg::Uint { value, decimals } => {
                let parsed = match (value, decimals) {
                    (UintLiteral::Number(n), None) => Ok(U256::from(*n)),
                    (UintLiteral::Number(n), Some(d)) => {
                        parse_units(&n.to_string(), *d).map_err(|e| e.to_string())
                    }
                    (UintLiteral::Text(text), None) => parse_uint(text).map_err(|e| e.to_string()),
                    (UintLiteral::Text(text), Some(d)) => {
                        parse_units(text, *d).map_err(|e| e.to_string())
                    }
                };
                parsed.map(AbiValue::Uint)
            }
            PlanArg::Bool { value } => Ok(AbiValue::Bool(*value)),
            PlanArg::Address { value } => parse_address(value)
                .map(AbiValue::Address)
                .map_err(|e| e.to_string()),
            PlanArg::String { value } => Ok(AbiValue::String(value.clone())),
            PlanArg::Bytes { value } => hex::decode(value.strip_prefix("0x").unwrap_or(value))
                .map(AbiValue::Bytes)
                .map_err(|e| format!("invalid hex bytes: {}", e)),
            PlanArg::Ref { label } => match resolve(label)? {
                Some(address) => Ok(AbiValue::Address(address)),
                None => Err(format!("no address recorded for '{}'", label)),
            },
            PlanArg::Tuple { items } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item.resolve(resolve)? {
                        Ok(value) => values.push(value),
                        Err(reason) => return Ok(Err(reason)),
                    }
                }
                Ok(AbiValue::Tuple(values))
            }
        };
        Ok(value)
    }
}

impl DeployPlan {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let path = path.as_ref();
        let plan_error = |reason: String| DeployError::PlanFile {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| plan_error(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| plan_error(e.to_string()))
    }

    /// Run every step in order, halting at the first failure
    ///
    /// Addresses recorded before the failure stay recorded, so rerunning
    /// the plan resumes where it stopped.
    pub async fn execute<N: NetworkClient>(
        &self,
        deployer: &mut Deployer<N>,
    ) -> Result<Vec<Deployment>, DeployError> {
        if self.write_chain_info {
            deployer.write_chain_info().await?;
        }

        let mut deployments = Vec::with_capacity(self.contracts.len());
        for step in &self.contracts {
            let spec = step.to_spec(|label| deployer.address_of(label))?;
            deployments.push(deployer.deploy_or_connect(&spec).await?);
        }

        let deployed = deployments
            .iter()
            .filter(|d| d.state == DeployState::Deployed)
            .count();
        info!(
            "✅ Plan complete: {} deployed, {} connected",
            deployed,
            deployments.len() - deployed
        );
        Ok(deployments)
    }
}
