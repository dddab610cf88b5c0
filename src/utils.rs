//! Exact decimal <-> smallest-unit conversions shared by the tool handlers.

use ethers_core::types::U256;

use crate::blockchain::models::ToolError;

/// Largest `decimals` value whose scale factor `10^decimals` still fits in a `U256`.
pub const MAX_DECIMALS: u32 = 77;

/// Returns true for a non-negative decimal literal such as `10`, `1.5` or `.5`.
pub fn is_decimal_amount(amount: &str) -> bool {
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    !(whole.is_empty() && frac.is_empty()) && digits_only(whole) && digits_only(frac)
}

/// Converts a human-readable amount into its smallest-unit integer value.
///
/// The result is `round(amount * 10^decimals)` computed on integers, rounding
/// half up when `amount` carries more fractional digits than `decimals`.
pub fn amount_to_raw(field: &str, amount: &str, decimals: u32) -> Result<U256, ToolError> {
    let amount = amount.trim();
    if !is_decimal_amount(amount) {
        return Err(ToolError::invalid(field, "Invalid decimal amount"));
    }
    if decimals > MAX_DECIMALS {
        return Err(ToolError::invalid(
            field,
            format!("Unsupported decimals value {decimals}"),
        ));
    }

    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    let width = decimals as usize;
    let (kept, dropped) = if frac.len() > width {
        frac.split_at(width)
    } else {
        (frac, "")
    };
    let round_up = dropped.chars().next().is_some_and(|c| c >= '5');

    // whole digits followed by the fraction padded out to `decimals` places
    let mut digits = String::with_capacity(whole.len() + width);
    digits.push_str(whole);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(width - kept.len()));
    let digits = digits.trim_start_matches('0');

    let overflow = || ToolError::invalid(field, "Amount is too large");
    let raw = if digits.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(digits).map_err(|_| overflow())?
    };
    if round_up {
        raw.checked_add(U256::one()).ok_or_else(overflow)
    } else {
        Ok(raw)
    }
}

/// Formats a smallest-unit value as a decimal string with `decimals` fractional
/// digits, dropping trailing zeros (`1500000` with 6 decimals gives `1.5`).
pub fn raw_to_amount(raw: U256, decimals: u32) -> String {
    let digits = raw.to_string();
    let width = decimals as usize;
    if width == 0 {
        return digits;
    }

    let padded = if digits.len() <= width {
        format!("{}{}", "0".repeat(width + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - width);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}
