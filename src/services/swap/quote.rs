// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::common::time_utils::current_unix;
use crate::domain::types::{FeeTier, Quote, Token};
use crate::infrastructure::data::gateway::{ContractGateway, QuoteRequest};
use alloy::primitives::{Address, U256};
use std::sync::Arc;

/// Prices a single-pool exact-input swap through the V3 quoter.
pub struct QuoteEngine {
    gateway: Arc<dyn ContractGateway>,
    quoter: Address,
}

impl QuoteEngine {
    pub fn new(gateway: Arc<dyn ContractGateway>, quoter: Address) -> Self {
        Self { gateway, quoter }
    }

    pub async fn get_quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        fee_tier: FeeTier,
        amount_in: U256,
    ) -> Result<Quote, AppError> {
        let request = QuoteRequest {
            token_in: token_in.address,
            token_out: token_out.address,
            fee_tier,
            amount_in,
            sqrt_price_limit_x96: U256::ZERO,
        };
        let amount_out = self
            .gateway
            .quote_exact_input_single(self.quoter, &request)
            .await
            .map_err(|e| match e {
                AppError::QuoteUnavailable(_) => e,
                other => AppError::QuoteUnavailable(other.to_string()),
            })?;

        // A zero quote means the pool cannot fill the trade.
        if amount_out.is_zero() {
            return Err(AppError::QuoteUnavailable(format!(
                "{} -> {} pool at fee {} quoted zero output",
                token_in.symbol, token_out.symbol, fee_tier
            )));
        }

        tracing::debug!(
            target: "quote",
            token_in = %token_in.symbol,
            token_out = %token_out.symbol,
            fee = fee_tier.as_u32(),
            %amount_in,
            %amount_out,
            "Quote obtained"
        );
        Ok(Quote {
            expected_amount_out: amount_out,
            obtained_at: current_unix(),
        })
    }
}
