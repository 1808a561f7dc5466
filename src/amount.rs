use alloy_primitives::U256;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Parse a human-readable decimal token amount into base units.
///
/// Enforces that fractional digits do not exceed the token decimals.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        anyhow::bail!("invalid amount {amount:?}");
    }
    let mut parts = trimmed.split('.');
    let whole_part = parts.next().unwrap_or("0");
    let fraction_part = parts.next();
    if parts.next().is_some() {
        anyhow::bail!("invalid amount {amount}");
    }

    let whole = if whole_part.is_empty() {
        U256::ZERO
    } else {
        parse_digits(whole_part, amount)?
    };
    let base = pow10(decimals as u32)?;
    let mut value = whole
        .checked_mul(base)
        .ok_or_else(|| anyhow!("amount overflow"))?;

    if let Some(fraction_part) = fraction_part {
        if fraction_part.len() > decimals as usize {
            anyhow::bail!("amount has too many decimal places (max {decimals})");
        }
        if !fraction_part.is_empty() {
            let fraction = parse_digits(fraction_part, amount)?;
            let scale = pow10(decimals as u32 - fraction_part.len() as u32)?;
            value += fraction * scale;
        } else if whole_part.is_empty() {
            anyhow::bail!("invalid amount {amount}");
        }
    }

    Ok(value)
}

/// Format a base-unit value with the given decimals.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let decimals = decimals as usize;
    let digits = format!("{:0>width$}", value.to_string(), width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// 10^exp, failing instead of wrapping past 2^256.
pub fn pow10(exp: u32) -> Result<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(exp))
        .ok_or_else(|| anyhow!("10^{exp} does not fit in 256 bits"))
}

fn parse_digits(value: &str, amount: &str) -> Result<U256> {
    if !value.bytes().all(|byte| byte.is_ascii_digit()) {
        anyhow::bail!("invalid amount {amount}");
    }
    U256::from_str(value).map_err(|err| anyhow!("invalid amount {amount}: {err}"))
}
