// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn parse_boolish(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    Address::from_str(strip_0x(s.trim())).ok()
}

pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw.trim()).map_err(|e| AppError::Validation {
        field: field.to_string(),
        message: format!("{raw:?} is not a decimal number: {e}"),
    })
}

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Human amount -> token base units (`amount * 10^decimals`).
///
/// Fractional digits beyond `decimals` are truncated. Negative amounts are
/// rejected.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256, AppError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::Validation {
            field: "amount_in".into(),
            message: format!("{amount} is negative"),
        });
    }
    let amount = amount.normalize();
    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();
    let decimals = u32::from(decimals);
    let units = if scale <= decimals {
        mantissa.checked_mul(pow10(decimals - scale))
    } else {
        Some(mantissa / pow10(scale - decimals))
    };
    units.ok_or_else(|| AppError::Validation {
        field: "amount_in".into(),
        message: format!("{amount} overflows uint256 at {decimals} decimals"),
    })
}

/// Base units -> human string with trailing zeros trimmed (2000000 @ 6 -> "2").
pub fn format_base_units(amount: U256, decimals: u8) -> String {
    let divisor = pow10(u32::from(decimals));
    let whole = amount / divisor;
    let frac = amount % divisor;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac_str = format!("{:0>width$}", frac.to_string(), width = usize::from(decimals));
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}
