// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::parsing::parse_decimal;
use crate::domain::constants::{
    self, DEFAULT_AMOUNT_IN, DEFAULT_DEADLINE_SECS, DEFAULT_FEE_TIER,
    DEFAULT_INVOCATION_TIMEOUT_MS, DEFAULT_NETWORK, DEFAULT_SLIPPAGE_TOLERANCE, NetworkProfile,
};
use crate::domain::error::AppError;
use crate::domain::types::FeeTier;
use crate::infrastructure::network::credentials::{
    CredentialProvider, KeystoreCredentials, PrivateKeyCredentials,
};
use alloy::primitives::Address;
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,

    // Network
    #[serde(default = "default_network")]
    pub network: String,
    pub rpc_url: Option<String>,
    /// Network profile name -> RPC URL.
    pub http_providers: Option<HashMap<String, String>>,

    // Identity
    pub keystore_path: Option<String>,
    pub keystore_password: Option<String>,
    pub wallet_key: Option<String>,
    /// When set, the loaded signer must match it.
    pub wallet_address: Option<Address>,

    // Swap
    #[serde(default = "default_token_in")]
    pub token_in: Address,
    #[serde(default = "default_token_out")]
    pub token_out: Address,
    #[serde(default = "default_router")]
    pub router: Address,
    #[serde(default = "default_quoter")]
    pub quoter: Address,
    #[serde(default = "default_fee_tier")]
    pub fee_tier: u32,
    /// Human units of `token_in` sold per invocation.
    #[serde(default = "default_amount_in")]
    pub amount_in: String,
    /// Fraction of the quote the swap may lose, e.g. "0.01".
    #[serde(default = "default_slippage_tolerance")]
    pub slippage_tolerance: String,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_true")]
    pub dry_run: bool,
    #[serde(default = "default_true")]
    pub verbose: bool,

    // Contract resolution
    pub abi_dir: Option<String>,
    pub explorer_api_url: Option<String>,
    pub etherscan_api_key: Option<String>,

    #[serde(default = "default_invocation_timeout_ms")]
    pub invocation_timeout_ms: u64,
}

// Defaults
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}
fn default_token_in() -> Address {
    constants::USDC_E_ARBITRUM
}
fn default_token_out() -> Address {
    constants::WETH_ARBITRUM
}
fn default_router() -> Address {
    constants::UNISWAP_V3_SWAP_ROUTER02
}
fn default_quoter() -> Address {
    constants::UNISWAP_V3_QUOTER
}
fn default_fee_tier() -> u32 {
    DEFAULT_FEE_TIER
}
fn default_amount_in() -> String {
    DEFAULT_AMOUNT_IN.to_string()
}
fn default_slippage_tolerance() -> String {
    DEFAULT_SLIPPAGE_TOLERANCE.to_string()
}
fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}
fn default_invocation_timeout_ms() -> u64 {
    DEFAULT_INVOCATION_TIMEOUT_MS
}

/// Command-line values layered over file and environment settings.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub dry_run: Option<bool>,
    pub amount_in: Option<String>,
    pub slippage_tolerance: Option<String>,
    pub fee_tier: Option<u32>,
    pub verbose: Option<bool>,
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = path {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: CLI (in main) > env/.env > config file.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Highest-precedence layer; unset fields keep the file/env value.
    pub fn apply_overrides(&mut self, overrides: SettingsOverrides) {
        if let Some(dry_run) = overrides.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(amount) = overrides.amount_in {
            self.amount_in = amount;
        }
        if let Some(slippage) = overrides.slippage_tolerance {
            self.slippage_tolerance = slippage;
        }
        if let Some(fee) = overrides.fee_tier {
            self.fee_tier = fee;
        }
        if let Some(verbose) = overrides.verbose {
            self.verbose = verbose;
        }
    }

    pub fn network_profile(&self) -> Result<&'static NetworkProfile, AppError> {
        constants::network_profile(&self.network).ok_or_else(|| {
            AppError::Config(format!("Unknown network profile {:?}", self.network))
        })
    }

    /// `rpc_url` wins; otherwise `http_providers[network]`.
    pub fn rpc_url_value(&self) -> Result<String, AppError> {
        if let Some(url) = self
            .rpc_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return Ok(url.to_string());
        }
        if let Some(urls) = &self.http_providers
            && let Some(url) = urls.get(self.network.trim())
        {
            return Ok(url.trim().to_string());
        }
        Err(AppError::Config(format!(
            "No RPC URL found for network {}",
            self.network
        )))
    }

    /// Keystore takes precedence over a raw key.
    pub fn credentials(&self) -> Result<Box<dyn CredentialProvider>, AppError> {
        if let Some(path) = non_empty(&self.keystore_path) {
            let password = self.keystore_password.clone().ok_or_else(|| {
                AppError::AccountLoad(format!("keystore_password missing for {path}"))
            })?;
            return Ok(Box::new(KeystoreCredentials::new(path, password)));
        }
        if let Some(key) = non_empty(&self.wallet_key) {
            return Ok(Box::new(PrivateKeyCredentials::new(key)));
        }
        Err(AppError::AccountLoad(
            "neither keystore_path nor wallet_key is configured".into(),
        ))
    }

    pub fn explorer_api_url_value(&self) -> Result<String, AppError> {
        match non_empty(&self.explorer_api_url) {
            Some(url) => Ok(url),
            None => Ok(self.network_profile()?.explorer_api_url.to_string()),
        }
    }

    pub fn etherscan_api_key_value(&self) -> Option<String> {
        non_empty(&self.etherscan_api_key)
    }

    pub fn abi_dir_value(&self) -> Option<String> {
        non_empty(&self.abi_dir)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_millis(self.invocation_timeout_ms.max(1))
    }

    pub fn swap_config(&self) -> Result<SwapConfig, AppError> {
        SwapConfig::from_settings(self)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Validated parameters of one swap invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapConfig {
    pub token_in: Address,
    pub token_out: Address,
    pub router: Address,
    pub quoter: Address,
    pub fee_tier: FeeTier,
    pub amount_in_human: Decimal,
    pub slippage_tolerance: Decimal,
    pub deadline_secs: u64,
    pub dry_run: bool,
    pub verbose: bool,
}

impl SwapConfig {
    pub fn from_settings(settings: &GlobalSettings) -> Result<Self, AppError> {
        let config = Self {
            token_in: settings.token_in,
            token_out: settings.token_out,
            router: settings.router,
            quoter: settings.quoter,
            fee_tier: FeeTier::try_from(settings.fee_tier)?,
            amount_in_human: parse_decimal("amount_in", &settings.amount_in)?,
            slippage_tolerance: parse_decimal(
                "slippage_tolerance",
                &settings.slippage_tolerance,
            )?,
            deadline_secs: settings.deadline_secs,
            dry_run: settings.dry_run,
            verbose: settings.verbose,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.token_in == self.token_out {
            return Err(AppError::Validation {
                field: "token_out".into(),
                message: "token_in and token_out must differ".into(),
            });
        }
        for (field, addr) in [
            ("token_in", self.token_in),
            ("token_out", self.token_out),
            ("router", self.router),
            ("quoter", self.quoter),
        ] {
            if addr == Address::ZERO {
                return Err(AppError::Validation {
                    field: field.into(),
                    message: "zero address".into(),
                });
            }
        }
        if self.amount_in_human <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount_in".into(),
                message: format!("{} must be positive", self.amount_in_human),
            });
        }
        if self.slippage_tolerance < Decimal::ZERO || self.slippage_tolerance >= Decimal::ONE {
            return Err(AppError::Validation {
                field: "slippage_tolerance".into(),
                message: format!("{} must be within [0, 1)", self.slippage_tolerance),
            });
        }
        if self.deadline_secs == 0 {
            return Err(AppError::Validation {
                field: "deadline_secs".into(),
                message: "must be at least one second".into(),
            });
        }
        Ok(())
    }
}
