// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::types::{Router, Token, TxHandle};
use crate::infrastructure::data::gateway::ContractGateway;
use crate::services::swap::events::ApprovalStatus;
use alloy::primitives::{Address, U256};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub token: Address,
    pub symbol: String,
    pub router: Address,
    pub allowance: U256,
    pub balance: U256,
    pub status: ApprovalStatus,
    pub tx: Option<TxHandle>,
}

/// Keeps router allowances at or above the owner's balance.
pub struct ApprovalManager {
    gateway: Arc<dyn ContractGateway>,
    dry_run: bool,
}

impl ApprovalManager {
    pub fn new(gateway: Arc<dyn ContractGateway>, dry_run: bool) -> Self {
        Self { gateway, dry_run }
    }

    /// For every (router, token) pair: approve `U256::MAX` when the current
    /// allowance is below the owner's balance, otherwise leave it alone.
    /// The first failing pair aborts the whole run.
    pub async fn ensure_approvals(
        &self,
        tokens: &[Token],
        routers: &[Router],
        owner: Address,
    ) -> Result<Vec<ApprovalOutcome>, AppError> {
        let mut outcomes = Vec::with_capacity(tokens.len() * routers.len());
        for router in routers {
            for token in tokens {
                outcomes.push(self.ensure_pair(token, router.address(), owner).await?);
            }
        }
        Ok(outcomes)
    }

    async fn ensure_pair(
        &self,
        token: &Token,
        router: Address,
        owner: Address,
    ) -> Result<ApprovalOutcome, AppError> {
        let pair_error = |reason: String| AppError::Approval {
            token: format!("{} ({:#x})", token.symbol, token.address),
            router: format!("{router:#x}"),
            reason,
        };

        let allowance = self
            .gateway
            .allowance(token.address, owner, router)
            .await
            .map_err(|e| pair_error(e.to_string()))?;
        let balance = self
            .gateway
            .balance_of(token.address, owner)
            .await
            .map_err(|e| pair_error(e.to_string()))?;

        let mut outcome = ApprovalOutcome {
            token: token.address,
            symbol: token.symbol.clone(),
            router,
            allowance,
            balance,
            status: ApprovalStatus::Sufficient,
            tx: None,
        };

        if allowance >= balance {
            tracing::debug!(
                target: "approvals",
                token = %token.symbol,
                router = %format!("{router:#x}"),
                "Allowance OK"
            );
            return Ok(outcome);
        }

        if self.dry_run {
            tracing::info!(
                target: "approvals",
                token = %token.symbol,
                router = %format!("{router:#x}"),
                %allowance,
                %balance,
                "Dry-run: would approve unlimited allowance"
            );
            outcome.status = ApprovalStatus::WouldApprove;
            return Ok(outcome);
        }

        let tx = self
            .gateway
            .approve(token.address, router, U256::MAX, owner)
            .await
            .map_err(|e| pair_error(e.to_string()))?;
        tracing::info!(
            target: "approvals",
            token = %token.symbol,
            router = %format!("{router:#x}"),
            tx = %tx,
            "Approved unlimited allowance"
        );
        outcome.status = ApprovalStatus::Approved;
        outcome.tx = Some(tx);
        Ok(outcome)
    }
}
