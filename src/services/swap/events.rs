// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::types::{FeeTier, TxHandle};
use alloy::primitives::{Address, U256};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Allowance already covers the balance.
    Sufficient,
    Approved,
    /// Dry run: the approval would have been sent.
    WouldApprove,
}

/// What the pipeline did at each stage; enough to diagnose a run from its
/// own output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SwapEvent {
    ApprovalChecked {
        token: String,
        router: Address,
        allowance: U256,
        balance: U256,
        status: ApprovalStatus,
        tx: Option<TxHandle>,
    },
    Balances {
        token_in: String,
        token_out: String,
        amount_in: U256,
        balance_in: U256,
        balance_out: U256,
    },
    Parameters {
        token_in: Address,
        token_out: Address,
        fee_tier: FeeTier,
        amount_in: U256,
        amount_in_human: String,
        sqrt_price_limit_x96: U256,
    },
    Quoted {
        expected_amount_out: U256,
        expected_amount_out_human: String,
    },
    Planned {
        amount_out_minimum: U256,
        amount_out_minimum_human: String,
        deadline: u64,
    },
    DryRun {
        router: Address,
        calldata: String,
    },
    Submitted {
        tx: TxHandle,
    },
    SubmissionFailed {
        reason: String,
    },
    Aborted {
        stage: String,
        reason: String,
    },
}

impl SwapEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SwapEvent::ApprovalChecked { .. } => "approval_checked",
            SwapEvent::Balances { .. } => "balances",
            SwapEvent::Parameters { .. } => "parameters",
            SwapEvent::Quoted { .. } => "quoted",
            SwapEvent::Planned { .. } => "planned",
            SwapEvent::DryRun { .. } => "dry_run",
            SwapEvent::Submitted { .. } => "submitted",
            SwapEvent::SubmissionFailed { .. } => "submission_failed",
            SwapEvent::Aborted { .. } => "aborted",
        }
    }
}

/// Ordered event log for one invocation. Each event is also logged: at
/// `info` when verbose, `debug` otherwise.
#[derive(Debug, Default)]
pub struct EventLog {
    verbose: bool,
    events: Vec<SwapEvent>,
}

impl EventLog {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: SwapEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| format!("{event:?}"));
        let failure = matches!(
            event,
            SwapEvent::SubmissionFailed { .. } | SwapEvent::Aborted { .. }
        );
        if failure {
            tracing::warn!(target: "swap", event = event.name(), detail = %payload, "Swap stage failed");
        } else if self.verbose {
            tracing::info!(target: "swap", event = event.name(), detail = %payload, "Swap stage");
        } else {
            tracing::debug!(target: "swap", event = event.name(), detail = %payload, "Swap stage");
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[SwapEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SwapEvent> {
        self.events
    }
}
