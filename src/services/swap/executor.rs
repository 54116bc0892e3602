// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::types::{SwapInstruction, SwapResult};
use crate::infrastructure::data::gateway::ContractGateway;
use alloy::primitives::Address;
use std::sync::Arc;

pub struct SwapExecutor {
    gateway: Arc<dyn ContractGateway>,
    router: Address,
}

impl SwapExecutor {
    pub fn new(gateway: Arc<dyn ContractGateway>, router: Address) -> Self {
        Self { gateway, router }
    }

    pub fn router(&self) -> Address {
        self.router
    }

    /// Dry run never touches the gateway. Live runs submit once from the
    /// instruction's recipient; any failure comes back as `Failed`.
    pub async fn execute(&self, instruction: &SwapInstruction, dry_run: bool) -> SwapResult {
        if dry_run {
            tracing::info!(
                target: "executor",
                router = %format!("{:#x}", self.router),
                amount_in = %instruction.amount_in,
                min_out = %instruction.amount_out_minimum,
                "Dry-run: swap not submitted"
            );
            return SwapResult::Simulated(instruction.clone());
        }

        match self
            .gateway
            .submit_swap(self.router, instruction, instruction.recipient)
            .await
        {
            Ok(tx) => {
                tracing::info!(
                    target: "executor",
                    tx = %tx,
                    block = ?tx.block_number,
                    gas_used = tx.gas_used,
                    "Swap confirmed"
                );
                SwapResult::Submitted(tx)
            }
            Err(e) => {
                tracing::warn!(target: "executor", error = %e, "Swap submission failed");
                SwapResult::Failed(e.to_string())
            }
        }
    }
}
