//! Decimal amount scaling
//!
//! Contracts store amounts as integers scaled by a fixed number of decimals:
//! USD values use 30, oracle prices use 8, multipliers use 4 (basis of 10_000).

use crate::errors::UnitsError;
use crate::U256;

/// Decimals of USD-denominated values
pub const USD_DECIMALS: u32 = 30;

/// Decimals of oracle prices
pub const ORACLE_PRICE_DECIMALS: u32 = 8;

/// Basis of on-chain multipliers (1.0 == 10_000)
pub const MULTIPLIER_BASIS: u64 = 10_000;

/// Largest scale whose power of ten fits in 256 bits
pub const MAX_DECIMALS: u32 = 77;

/// Scale a decimal string such as `"1.5"` by `10^decimals`
pub fn parse_units(input: &str, decimals: u32) -> Result<U256, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::Overflow {
            input: input.to_string(),
            decimals,
        });
    }

    let trimmed = input.trim();
    let invalid = || UnitsError::InvalidDecimal {
        input: input.to_string(),
    };

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(UnitsError::PrecisionLoss {
            input: input.to_string(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_dec_str(digits).map_err(|_| UnitsError::Overflow {
        input: input.to_string(),
        decimals,
    })
}

/// Render a scaled integer back to a decimal string, keeping at least one fractional digit
pub fn format_units(value: U256, decimals: u32) -> Result<String, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::Overflow {
            input: value.to_string(),
            decimals,
        });
    }
    if decimals == 0 {
        return Ok(value.to_string());
    }

    let scale = U256::exp10(decimals as usize);
    let whole = value / scale;
    let fraction = (value % scale).to_string();
    let padded = format!("{:0>width$}", fraction, width = decimals as usize);
    let trimmed = padded.trim_end_matches('0');

    if trimmed.is_empty() {
        Ok(format!("{}.0", whole))
    } else {
        Ok(format!("{}.{}", whole, trimmed))
    }
}

pub fn to_usd(input: &str) -> Result<U256, UnitsError> {
    parse_units(input, USD_DECIMALS)
}

pub fn format_usd(value: U256) -> String {
    format_units(value, USD_DECIMALS)
        .unwrap_or_else(|e| unreachable!("USD scale is within range: {}", e))
}

pub fn to_oracle_price(input: &str) -> Result<U256, UnitsError> {
    parse_units(input, ORACLE_PRICE_DECIMALS)
}

/// `2` becomes `20_000`
pub fn expand_to_multiplier(amount: u64) -> u64 {
    amount * MULTIPLIER_BASIS
}
