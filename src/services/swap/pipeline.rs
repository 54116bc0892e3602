// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::SwapConfig;
use crate::common::error::{AppError, EXIT_OK, EXIT_SUBMISSION};
use crate::common::parsing::format_base_units;
use crate::domain::types::{Router, SwapResult, Token};
use crate::infrastructure::data::gateway::{ContractGateway, encode_swap_multicall};
use crate::services::swap::approvals::ApprovalManager;
use crate::services::swap::events::{EventLog, SwapEvent};
use crate::services::swap::executor::SwapExecutor;
use crate::services::swap::planner::SwapPlanner;
use crate::services::swap::quote::QuoteEngine;
use alloy::primitives::{Address, U256};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    ApprovalsChecked,
    BalanceVerified,
    Quoted,
    Planned,
    Simulated,
    Submitted,
    Failed,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::ApprovalsChecked => "approvals_checked",
            Stage::BalanceVerified => "balance_verified",
            Stage::Quoted => "quoted",
            Stage::Planned => "planned",
            Stage::Simulated => "simulated",
            Stage::Submitted => "submitted",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one pipeline run.
///
/// `stage` is where the run ended: a terminal stage on completion, or the
/// stage whose check stopped it (e.g. `BalanceVerified` for a short wallet).
#[derive(Debug)]
pub struct Invocation {
    pub stage: Stage,
    pub events: Vec<SwapEvent>,
    pub outcome: Result<SwapResult, AppError>,
}

impl Invocation {
    pub fn exit_code(&self) -> u8 {
        match &self.outcome {
            Ok(SwapResult::Failed(_)) => EXIT_SUBMISSION,
            Ok(_) => EXIT_OK,
            Err(e) => e.exit_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == EXIT_OK
    }
}

/// Approvals, balance pre-flight, quote, plan and execute for one swap.
pub struct SwapPipeline {
    gateway: Arc<dyn ContractGateway>,
    config: SwapConfig,
    token_in: Token,
    token_out: Token,
    router: Router,
}

impl SwapPipeline {
    pub fn new(
        gateway: Arc<dyn ContractGateway>,
        config: SwapConfig,
        token_in: Token,
        token_out: Token,
        router: Router,
    ) -> Self {
        Self {
            gateway,
            config,
            token_in,
            token_out,
            router,
        }
    }

    pub async fn run(&self, owner: Address) -> Invocation {
        let mut log = EventLog::new(self.config.verbose);
        let mut stage = Stage::Init;
        let outcome = self.drive(owner, &mut stage, &mut log).await;
        if let Err(e) = &outcome {
            log.emit(SwapEvent::Aborted {
                stage: stage.to_string(),
                reason: e.to_string(),
            });
        }
        tracing::info!(
            target: "swap",
            stage = %stage,
            dry_run = self.config.dry_run,
            ok = matches!(&outcome, Ok(r) if r.is_success()),
            "Invocation finished"
        );
        Invocation {
            stage,
            events: log.into_events(),
            outcome,
        }
    }

    async fn drive(
        &self,
        owner: Address,
        stage: &mut Stage,
        log: &mut EventLog,
    ) -> Result<SwapResult, AppError> {
        let (token_in, token_out) = (&self.token_in, &self.token_out);

        // Approvals
        *stage = Stage::ApprovalsChecked;
        let approvals = ApprovalManager::new(self.gateway.clone(), self.config.dry_run);
        let outcomes = approvals
            .ensure_approvals(
                &[token_in.clone(), token_out.clone()],
                std::slice::from_ref(&self.router),
                owner,
            )
            .await?;
        for outcome in outcomes {
            log.emit(SwapEvent::ApprovalChecked {
                token: outcome.symbol,
                router: outcome.router,
                allowance: outcome.allowance,
                balance: outcome.balance,
                status: outcome.status,
                tx: outcome.tx,
            });
        }

        // Balance pre-flight, before any quote
        *stage = Stage::BalanceVerified;
        let planner = SwapPlanner::new(&self.config);
        let amount_in = planner.amount_in(token_in)?;
        if amount_in.is_zero() {
            return Err(AppError::Validation {
                field: "amount_in".into(),
                message: format!(
                    "{} is below one base unit of {}",
                    self.config.amount_in_human, token_in.symbol
                ),
            });
        }
        let balance_in = self.gateway.balance_of(token_in.address, owner).await?;
        let balance_out = self.gateway.balance_of(token_out.address, owner).await?;
        log.emit(SwapEvent::Balances {
            token_in: token_in.symbol.clone(),
            token_out: token_out.symbol.clone(),
            amount_in,
            balance_in,
            balance_out,
        });
        planner.verify_balance(token_in, balance_in, amount_in)?;
        log.emit(SwapEvent::Parameters {
            token_in: token_in.address,
            token_out: token_out.address,
            fee_tier: self.config.fee_tier,
            amount_in,
            amount_in_human: format_base_units(amount_in, token_in.decimals),
            sqrt_price_limit_x96: U256::ZERO,
        });

        // Quote
        *stage = Stage::Quoted;
        let quote = QuoteEngine::new(self.gateway.clone(), self.config.quoter)
            .get_quote(token_in, token_out, self.config.fee_tier, amount_in)
            .await?;
        log.emit(SwapEvent::Quoted {
            expected_amount_out: quote.expected_amount_out,
            expected_amount_out_human: format_base_units(
                quote.expected_amount_out,
                token_out.decimals,
            ),
        });

        // Plan
        *stage = Stage::Planned;
        let instruction = planner.plan(token_in, token_out, &quote, amount_in, owner);
        log.emit(SwapEvent::Planned {
            amount_out_minimum: instruction.amount_out_minimum,
            amount_out_minimum_human: format_base_units(
                instruction.amount_out_minimum,
                token_out.decimals,
            ),
            deadline: instruction.deadline,
        });

        // Execute
        let executor = SwapExecutor::new(self.gateway.clone(), self.router.address());
        let result = executor.execute(&instruction, self.config.dry_run).await;
        match &result {
            SwapResult::Simulated(instruction) => {
                *stage = Stage::Simulated;
                log.emit(SwapEvent::DryRun {
                    router: executor.router(),
                    calldata: format!("0x{}", hex::encode(encode_swap_multicall(instruction))),
                });
            }
            SwapResult::Submitted(tx) => {
                *stage = Stage::Submitted;
                log.emit(SwapEvent::Submitted { tx: *tx });
            }
            SwapResult::Failed(reason) => {
                *stage = Stage::Failed;
                log.emit(SwapEvent::SubmissionFailed {
                    reason: reason.clone(),
                });
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_display_in_snake_case() {
        assert_eq!(Stage::BalanceVerified.to_string(), "balance_verified");
        assert_eq!(Stage::Simulated.to_string(), "simulated");
    }

    #[test]
    fn failed_submission_maps_to_submission_exit_code() {
        let invocation = Invocation {
            stage: Stage::Failed,
            events: Vec::new(),
            outcome: Ok(SwapResult::Failed("reverted".into())),
        };
        assert_eq!(invocation.exit_code(), EXIT_SUBMISSION);
        assert!(!invocation.is_success());
    }
}
