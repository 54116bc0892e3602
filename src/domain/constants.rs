// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_OPTIMISM: u64 = 10;
pub const CHAIN_POLYGON: u64 = 137;
pub const CHAIN_BASE: u64 = 8453;
pub const CHAIN_ARBITRUM: u64 = 42161;

pub const DEFAULT_NETWORK: &str = "arbitrum-main";

/// Named network profile: expected chain id plus the Etherscan-family API
/// used for ABI discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: &'static str,
    pub chain_id: u64,
    pub explorer_api_url: &'static str,
    /// SwapRouter02 and QuoterV1 live at their canonical addresses here.
    pub uniswap_v3_canonical: bool,
}

pub const NETWORK_PROFILES: &[NetworkProfile] = &[
    NetworkProfile {
        name: "mainnet",
        chain_id: CHAIN_ETHEREUM,
        explorer_api_url: "https://api.etherscan.io/api",
        uniswap_v3_canonical: true,
    },
    NetworkProfile {
        name: "optimism-main",
        chain_id: CHAIN_OPTIMISM,
        explorer_api_url: "https://api-optimistic.etherscan.io/api",
        uniswap_v3_canonical: true,
    },
    NetworkProfile {
        name: "polygon-main",
        chain_id: CHAIN_POLYGON,
        explorer_api_url: "https://api.polygonscan.com/api",
        uniswap_v3_canonical: true,
    },
    NetworkProfile {
        name: "base-main",
        chain_id: CHAIN_BASE,
        explorer_api_url: "https://api.basescan.org/api",
        uniswap_v3_canonical: false,
    },
    NetworkProfile {
        name: "arbitrum-main",
        chain_id: CHAIN_ARBITRUM,
        explorer_api_url: "https://api.arbiscan.io/api",
        uniswap_v3_canonical: true,
    },
];

pub fn network_profile(name: &str) -> Option<&'static NetworkProfile> {
    let wanted = name.trim();
    NETWORK_PROFILES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
}

// =============================================================================
// ARBITRUM ASSETS & UNISWAP V3 DEPLOYMENT
// =============================================================================

/// Bridged USDC (USDC.e), 6 decimals.
pub const USDC_E_ARBITRUM: Address = address!("FF970A61A04b1cA14834A43f5dE4533eBDDB5CC8");
pub const WETH_ARBITRUM: Address = address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1");

/// SwapRouter02 at its canonical address (mainnet, Optimism, Polygon,
/// Arbitrum). Base uses a different deployment.
pub const UNISWAP_V3_SWAP_ROUTER02: Address =
    address!("68b3465833fb72A70ecDF485E0e4C7bD8665Fc45");
/// QuoterV1 (quoteExactInputSingle with positional args).
pub const UNISWAP_V3_QUOTER: Address = address!("b27308f9F90D607463bb33eA1BeBb41C27CE5AB6");

// =============================================================================
// SWAP DEFAULTS
// =============================================================================

pub const DEFAULT_FEE_TIER: u32 = 500;
pub const DEFAULT_AMOUNT_IN: &str = "2";
pub const DEFAULT_SLIPPAGE_TOLERANCE: &str = "0.01";
/// On-chain validity window for the swap transaction.
pub const DEFAULT_DEADLINE_SECS: u64 = 30;
pub const DEFAULT_INVOCATION_TIMEOUT_MS: u64 = 120_000;

/// Fee tiers are expressed in hundredths of a basis point.
pub const FEE_TIER_DENOMINATOR: u32 = 1_000_000;
