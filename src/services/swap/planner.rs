// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::app::config::SwapConfig;
use crate::common::error::AppError;
use crate::common::parsing::{format_base_units, to_base_units};
use crate::common::time_utils::current_unix;
use crate::domain::types::{Quote, SwapInstruction, Token};
use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;

/// `floor(expected * (1 - slippage))`, computed exactly in integer space.
///
/// `slippage` must already be validated to `[0, 1)`; anything outside that
/// range is clamped so the result stays within `[0, expected]`.
pub fn min_amount_out(expected: U256, slippage: Decimal) -> U256 {
    if slippage <= Decimal::ZERO {
        return expected;
    }
    if slippage >= Decimal::ONE {
        return U256::ZERO;
    }
    let keep = (Decimal::ONE - slippage).normalize();
    let numerator = U256::from(keep.mantissa().unsigned_abs());
    let denominator = U256::from(10u64).pow(U256::from(keep.scale()));

    // Split to avoid overflow: expected = q*d + r, so
    // floor(expected*n/d) = q*n + floor(r*n/d) with n < d.
    let q = expected / denominator;
    let r = expected % denominator;
    q * numerator + (r * numerator) / denominator
}

pub struct SwapPlanner {
    config: SwapConfig,
}

impl SwapPlanner {
    pub fn new(config: &SwapConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Configured input amount in `token_in` base units.
    pub fn amount_in(&self, token_in: &Token) -> Result<U256, AppError> {
        to_base_units(self.config.amount_in_human, token_in.decimals)
    }

    /// Pre-flight check against the owner's `token_in` balance; runs before
    /// any quote.
    pub fn verify_balance(
        &self,
        token_in: &Token,
        balance: U256,
        amount_in: U256,
    ) -> Result<U256, AppError> {
        if balance < amount_in {
            return Err(AppError::InsufficientBalance {
                token: token_in.symbol.clone(),
                required: format_base_units(amount_in, token_in.decimals),
                available: format_base_units(balance, token_in.decimals),
            });
        }
        Ok(balance)
    }

    pub fn plan(
        &self,
        token_in: &Token,
        token_out: &Token,
        quote: &Quote,
        amount_in: U256,
        owner: Address,
    ) -> SwapInstruction {
        self.plan_at(token_in, token_out, quote, amount_in, owner, current_unix())
    }

    pub fn plan_at(
        &self,
        token_in: &Token,
        token_out: &Token,
        quote: &Quote,
        amount_in: U256,
        owner: Address,
        now: u64,
    ) -> SwapInstruction {
        SwapInstruction {
            token_in: token_in.address,
            token_out: token_out.address,
            fee_tier: self.config.fee_tier,
            recipient: owner,
            amount_in,
            amount_out_minimum: min_amount_out(
                quote.expected_amount_out,
                self.config.slippage_tolerance,
            ),
            sqrt_price_limit_x96: U256::ZERO,
            deadline: now.saturating_add(self.config.deadline_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FeeTier;
    use std::str::FromStr;

    fn token(byte: u8, decimals: u8, symbol: &str) -> Token {
        Token {
            address: Address::from([byte; 20]),
            decimals,
            symbol: symbol.into(),
            name: symbol.into(),
        }
    }

    fn config(slippage: &str) -> SwapConfig {
        SwapConfig {
            token_in: Address::from([1u8; 20]),
            token_out: Address::from([2u8; 20]),
            router: Address::from([3u8; 20]),
            quoter: Address::from([4u8; 20]),
            fee_tier: FeeTier::Low,
            amount_in_human: Decimal::from(2),
            slippage_tolerance: Decimal::from_str(slippage).expect("decimal"),
            deadline_secs: 30,
            dry_run: true,
            verbose: false,
        }
    }

    #[test]
    fn one_percent_slippage_on_a_million() {
        let min = min_amount_out(U256::from(1_000_000u64), Decimal::from_str("0.01").unwrap());
        assert_eq!(min, U256::from(990_000u64));
    }

    #[test]
    fn zero_slippage_keeps_the_quote() {
        let expected = U256::from(123_456_789u64);
        assert_eq!(min_amount_out(expected, Decimal::ZERO), expected);
    }

    #[test]
    fn min_out_floors_and_never_exceeds_quote() {
        let slippage = Decimal::from_str("0.003").unwrap();
        for expected in [0u64, 1, 7, 999, 1_000_001, 987_654_321] {
            let expected = U256::from(expected);
            let min = min_amount_out(expected, slippage);
            assert!(min <= expected);
            // floor(e * 997 / 1000)
            assert_eq!(min, expected * U256::from(997u64) / U256::from(1000u64));
        }
    }

    #[test]
    fn min_out_does_not_overflow_near_uint_max() {
        let min = min_amount_out(U256::MAX, Decimal::from_str("0.5").unwrap());
        assert_eq!(min, U256::MAX / U256::from(2u64));
    }

    #[test]
    fn balance_below_amount_is_insufficient() {
        let planner = SwapPlanner::new(&config("0.01"));
        let usdc = token(1, 6, "USDC");
        let amount_in = U256::from(2_000_000u64);

        let err = planner
            .verify_balance(&usdc, U256::from(500_000u64), amount_in)
            .unwrap_err();
        match err {
            AppError::InsufficientBalance {
                token,
                required,
                available,
            } => {
                assert_eq!(token, "USDC");
                assert_eq!(required, "2");
                assert_eq!(available, "0.5");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            planner.verify_balance(&usdc, amount_in, amount_in).unwrap(),
            amount_in
        );
    }

    #[test]
    fn plan_fills_deadline_recipient_and_price_limit() {
        let planner = SwapPlanner::new(&config("0.01"));
        let usdc = token(1, 6, "USDC");
        let weth = token(2, 18, "WETH");
        let amount_in = planner.amount_in(&usdc).unwrap();
        assert_eq!(amount_in, U256::from(2_000_000u64));

        let owner = Address::from([9u8; 20]);
        let quote = Quote {
            expected_amount_out: U256::from(1_000_000u64),
            obtained_at: 1_700_000_000,
        };
        let instruction = planner.plan_at(&usdc, &weth, &quote, amount_in, owner, 1_700_000_000);
        assert_eq!(instruction.recipient, owner);
        assert_eq!(instruction.deadline, 1_700_000_030);
        assert_eq!(instruction.sqrt_price_limit_x96, U256::ZERO);
        assert_eq!(instruction.amount_out_minimum, U256::from(990_000u64));
        assert_eq!(instruction.fee_tier, FeeTier::Low);
    }
}
