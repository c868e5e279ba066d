//! # Deployment Types Library
//!
//! Shared value model for the deployment orchestrator and the key
//! derivation codec.
//!
//! ## Design Philosophy
//!
//! - **Tagged Values**: constructor arguments and key fields are `AbiValue`
//!   variants, never loosely-typed lists
//! - **Explicit Type Tags**: every encodable value is paired with a
//!   `ParamKind` so encoders can match exhaustively
//! - **No Precision Loss**: token amounts are scaled integers (`U256`)
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{AbiValue, ContractSpec, ParamKind};
//!
//! let kind: ParamKind = "(address,bool)".parse().unwrap();
//! assert_eq!(kind.to_string(), "(address,bool)");
//!
//! let spec = ContractSpec::new("TokenValidator")
//!     .with_arg(AbiValue::Bool(true))
//!     .with_label("TokenValidatorV2");
//! assert_eq!(spec.key(), "TokenValidatorV2");
//! ```

pub mod abi;
pub mod contract;
pub mod errors;
pub mod units;

pub use abi::{parse_uint, AbiValue, ParamKind};
pub use contract::{ChainInfo, ContractHandle, ContractSpec, NetworkConfig};
pub use errors::{TypeError, UnitsError};

// Chain primitives shared by every crate in the workspace
pub use ethabi::ethereum_types::{Address, H256, U256};

/// Parse a `0x`-prefixed (or bare) hex string into an `Address`
pub fn parse_address(input: &str) -> Result<Address, TypeError> {
    let cleaned = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut bytes).map_err(|_| TypeError::InvalidAddress {
        input: input.to_string(),
    })?;

    Ok(Address::from(bytes))
}

/// Lower-case `0x` hex rendering of an address, the form written to registry files
pub fn format_address(address: &Address) -> String {
    format!("{:#x}", address)
}
