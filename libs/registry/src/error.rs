//! Registry errors
//!
//! A registry file that cannot be read or parsed is reported, never
//! replaced: silently resetting it would forget deployed contracts.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Filesystem failure reading, writing or deleting a registry file
    #[error("Registry I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry file exists but is not a valid registry document
    #[error("Registry file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Recorded address for a label is not a 20-byte hex address
    #[error("Registry entry '{label}' on {network}/{chain_id} holds invalid address '{address}'")]
    InvalidAddress {
        network: String,
        chain_id: u64,
        label: String,
        address: String,
    },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
