//! Error types for value parsing and unit conversion

use thiserror::Error;

/// Errors raised while parsing addresses and type tags
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    /// Address is not 20 bytes of hex
    #[error("Invalid address '{input}': expected 20 bytes of hex")]
    InvalidAddress { input: String },

    /// Type descriptor is not a supported Solidity type
    #[error("Invalid type descriptor '{input}': expected uintN, bool, address, string, bytes or a tuple")]
    InvalidParamKind { input: String },

    /// Text cannot be read as a value of the given type
    #[error("Invalid {kind} value '{input}'")]
    InvalidValue { kind: String, input: String },
}

/// Errors raised while scaling decimal amounts to integers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitsError {
    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected numeric format")]
    InvalidDecimal { input: String },

    /// More fractional digits than the target precision
    #[error("Precision loss: '{input}' has more than {decimals} fractional digits")]
    PrecisionLoss { input: String, decimals: u32 },

    /// Scaled value does not fit in 256 bits
    #[error("Overflow: '{input}' scaled by 10^{decimals} exceeds 256 bits")]
    Overflow { input: String, decimals: u32 },
}
