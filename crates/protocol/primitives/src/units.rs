//! Fixed-point unit conversion.
//!
//! Conversion is integer division followed by a zero-padded remainder that is sliced to the
//! requested number of fraction digits. Digits past the cut are truncated, never rounded.

use alloy_primitives::U256;

/// Decimals of the native token.
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimals of gwei relative to wei.
const GWEI_DECIMALS: usize = 9;

fn split(value: U256, decimals: u8) -> (U256, String) {
    let base = U256::from(10u64).pow(U256::from(decimals));
    let int = value / base;
    let rem = (value % base).to_string();
    let mut frac = "0".repeat((decimals as usize).saturating_sub(rem.len()));
    frac.push_str(&rem);
    (int, frac)
}

/// Formats `value` raw units as a decimal with `decimals` places.
///
/// At most `max_fraction_digits` fraction digits are kept and trailing zeros are stripped,
/// together with the decimal point when nothing remains after it.
pub fn format_units(value: U256, decimals: u8, max_fraction_digits: usize) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let (int, mut frac) = split(value, decimals);
    frac.truncate(max_fraction_digits);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() { int.to_string() } else { format!("{int}.{frac}") }
}

/// Formats a wei amount in native units with up to `max_fraction_digits` digits.
pub fn format_native(wei: U256, max_fraction_digits: usize) -> String {
    format_units(wei, NATIVE_DECIMALS, max_fraction_digits)
}

/// Formats a wei amount in gwei with exactly `digits` fraction digits.
///
/// Unlike [`format_units`], trailing zeros are kept so gas prices line up in a table.
pub fn wei_to_gwei(wei: U256, digits: usize) -> String {
    let (int, mut frac) = split(wei, GWEI_DECIMALS as u8);
    if digits == 0 {
        return int.to_string();
    }
    frac.truncate(digits.min(GWEI_DECIMALS));
    format!("{int}.{frac}")
}
