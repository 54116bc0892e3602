// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::constants::FEE_TIER_DENOMINATOR;
use crate::domain::error::AppError;
use crate::infrastructure::data::gateway::ContractGateway;
use crate::infrastructure::data::resolver::ContractHandle;
use alloy::primitives::{Address, B256, U256};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Uniswap V3 pool fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum FeeTier {
    /// 0.05%
    Low,
    /// 0.3%
    Medium,
    /// 1%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 3] = [FeeTier::Low, FeeTier::Medium, FeeTier::High];

    pub fn as_u32(self) -> u32 {
        match self {
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    /// Pool fee as a percentage (500 -> 0.05).
    pub fn percent(self) -> f64 {
        f64::from(self.as_u32()) * 100.0 / f64::from(FEE_TIER_DENOMINATOR)
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        FeeTier::ALL
            .into_iter()
            .find(|tier| tier.as_u32() == value)
            .ok_or_else(|| AppError::Validation {
                field: "fee_tier".into(),
                message: format!("{value} is not one of 500, 3000, 10000"),
            })
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> Self {
        tier.as_u32()
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.as_u32(), self.percent())
    }
}

/// ERC-20 metadata, queried once at start-up.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl Token {
    pub async fn load(gateway: &dyn ContractGateway, address: Address) -> Result<Self, AppError> {
        let decimals = gateway.decimals(address).await?;
        let symbol = gateway.symbol(address).await?;
        let name = gateway.name(address).await?;
        tracing::debug!(
            target: "token",
            token = %format!("{address:#x}"),
            %symbol,
            decimals,
            "Loaded token metadata"
        );
        Ok(Self {
            address,
            decimals,
            symbol,
            name,
        })
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#x})", self.symbol, self.address)
    }
}

/// A swap router bound to a resolved interface.
#[derive(Debug, Clone)]
pub struct Router {
    pub handle: ContractHandle,
}

impl Router {
    pub fn new(handle: ContractHandle) -> Self {
        Self { handle }
    }

    pub fn address(&self) -> Address {
        self.handle.address
    }
}

impl PartialEq for Router {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for Router {}

impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.address())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Token-out base units.
    pub expected_amount_out: U256,
    /// Unix seconds at which the simulation returned.
    pub obtained_at: u64,
}

/// Fully specified exact-input single-pool swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapInstruction {
    pub token_in: Address,
    pub token_out: Address,
    pub fee_tier: FeeTier,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxHandle {
    pub hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SwapResult {
    Simulated(SwapInstruction),
    Submitted(TxHandle),
    Failed(String),
}

impl SwapResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, SwapResult::Failed(_))
    }
}
