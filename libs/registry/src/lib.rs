//! # Address Registry
//!
//! Persistent mapping from contract label to deployed address, one JSON
//! document per (network, chain id), plus the chain metadata recorded when a
//! deployment run starts.
//!
//! ## File layout
//!
//! ```text
//! <root>/<network>/addresses/<chainId>.json
//! {
//!   "chainInfo": { "chainId": 1, "network": "mainnet", "startBlock": 19000000, "rpc": "..." },
//!   "addresses": { "TokenValidator": "0x..." }
//! }
//! ```
//!
//! ## Invariants
//!
//! - Writes are read-merge-write: labels not named by a write survive it
//! - Unreadable or corrupt files are errors, never reset
//! - Ephemeral networks read as empty and never write
//!
//! ## Usage
//!
//! ```rust,no_run
//! use registry::{AddressRegistry, RegistryConfig};
//! use std::collections::BTreeMap;
//!
//! let registry = AddressRegistry::new(RegistryConfig::new("env").with_ephemeral("localhost"));
//! let mut entry = registry.get("mainnet", 1)?;
//! if entry.lookup("TokenValidator").is_none() {
//!     let updates = BTreeMap::from([(
//!         "TokenValidator".to_string(),
//!         "0x1111111111111111111111111111111111111111".to_string(),
//!     )]);
//!     registry.merge(&mut entry, updates)?;
//! }
//! # Ok::<(), registry::RegistryError>(())
//! ```

pub mod entry;
pub mod error;
pub mod store;

pub use entry::RegistryEntry;
pub use error::RegistryError;
pub use store::{AddressRegistry, RegistryConfig};
