//! Currency unit conversion between display text and smallest units.
//!
//! Budgets and proposed amounts live on the ledger as unsigned integers in the
//! smallest currency unit. Conversion is exact integer arithmetic; no floats.

use crate::error::{CoreError, CoreResult};

/// Decimal places of the native currency (1 ether = 10^18 wei).
pub const ETHER_DECIMALS: u32 = 18;

const MAX_DECIMALS: u32 = 38;

/// Parses decimal text (`"1.5"`) into smallest units with `decimals` places.
///
/// # Errors
/// - Returns `InvalidInput` for empty/non-numeric text, more fractional
///   digits than `decimals`, or values that do not fit in `u128`.
pub fn parse_units(text: &str, decimals: u32) -> CoreResult<u128> {
    let scale = scale_for(decimals)?;
    let trimmed = text.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(CoreError::InvalidInput(format!(
            "amount `{trimmed}` has no digits"
        )));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(CoreError::InvalidInput(format!(
            "amount `{trimmed}` is not a decimal number"
        )));
    }
    if fraction.len() > decimals as usize {
        return Err(CoreError::InvalidInput(format!(
            "amount `{trimmed}` has more than {decimals} decimal places"
        )));
    }

    let overflow = || CoreError::InvalidInput(format!("amount `{trimmed}` is too large"));
    let whole_value = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| overflow())?
    };
    let fraction_value = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<width$}", width = decimals as usize);
        padded.parse::<u128>().map_err(|_| overflow())?
    };

    whole_value
        .checked_mul(scale)
        .and_then(|value| value.checked_add(fraction_value))
        .ok_or_else(overflow)
}

/// Formats smallest units as decimal text, trimming trailing zeros.
pub fn format_units(value: u128, decimals: u32) -> String {
    let Ok(scale) = scale_for(decimals) else {
        return value.to_string();
    };
    if decimals == 0 {
        return value.to_string();
    }

    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{fraction:0>width$}", width = decimals as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Shorthand for `parse_units(text, ETHER_DECIMALS)`.
pub fn parse_ether(text: &str) -> CoreResult<u128> {
    parse_units(text, ETHER_DECIMALS)
}

/// Shorthand for `format_units(value, ETHER_DECIMALS)`.
pub fn format_ether(value: u128) -> String {
    format_units(value, ETHER_DECIMALS)
}

fn scale_for(decimals: u32) -> CoreResult<u128> {
    if decimals > MAX_DECIMALS {
        return Err(CoreError::InvalidInput(format!(
            "unsupported precision: {decimals} decimals"
        )));
    }
    Ok(10u128.pow(decimals))
}
