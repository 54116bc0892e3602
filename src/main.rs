// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use clap::Parser;
use oxidity_dca::app::config::{GlobalSettings, SettingsOverrides};
use oxidity_dca::app::logging::setup_logging;
use oxidity_dca::domain::constants::NetworkProfile;
use oxidity_dca::domain::error::AppError;
use oxidity_dca::domain::types::{Router, Token};
use oxidity_dca::infrastructure::data::abi::{AbiRegistry, InterfaceKind};
use oxidity_dca::infrastructure::data::gateway::{ContractGateway, RpcGateway};
use oxidity_dca::infrastructure::data::resolver::{
    ContractResolver, ExplorerAbiResolver, FallbackResolver, LocalAbiResolver,
};
use oxidity_dca::infrastructure::network::provider::ConnectionFactory;
use oxidity_dca::services::swap::SwapPipeline;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "oxidity dca: one Uniswap V3 exact-input swap per run")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Quote and plan only; no approval or swap transaction is sent
    #[arg(long, conflicts_with = "live")]
    dry_run: bool,

    /// Send approvals and the swap transaction
    #[arg(long)]
    live: bool,

    /// Amount of token_in in human units (overrides config/env)
    #[arg(long)]
    amount: Option<String>,

    /// Slippage tolerance as a fraction, e.g. 0.01 (overrides config/env)
    #[arg(long)]
    slippage: Option<String>,

    /// Pool fee tier: 500, 3000 or 10000 (overrides config/env)
    #[arg(long)]
    fee_tier: Option<u32>,

    /// Log every pipeline event at info level
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        let dry_run = match (self.dry_run, self.live) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        SettingsOverrides {
            dry_run,
            amount_in: self.amount.clone(),
            slippage_tolerance: self.slippage.clone(),
            fee_tier: self.fee_tier,
            verbose: self.verbose.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut settings = match GlobalSettings::load_with_path(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            setup_logging("info", false);
            tracing::error!(target: "config", error = %e, "Failed to load settings");
            return ExitCode::from(e.exit_code());
        }
    };
    settings.apply_overrides(cli.overrides());

    let log_level = if settings.debug { "debug" } else { "info" };
    setup_logging(log_level, settings.log_json);

    let timeout = settings.invocation_timeout();
    let code = match tokio::time::timeout(timeout, run(settings)).await {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            tracing::error!(target: "dca", error = %e, exit_code = e.exit_code(), "Invocation aborted");
            e.exit_code()
        }
        Err(_) => {
            let e = AppError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
            tracing::error!(target: "dca", error = %e, exit_code = e.exit_code(), "Invocation aborted");
            e.exit_code()
        }
    };
    ExitCode::from(code)
}

async fn run(settings: GlobalSettings) -> Result<u8, AppError> {
    let swap_config = settings.swap_config()?;
    let profile = settings.network_profile()?;
    let rpc_url = settings.rpc_url_value()?;

    let credentials = settings.credentials()?;
    tracing::info!(target: "account", source = %credentials.describe(), "Loading signer");
    let signer = credentials.load()?;
    let owner = signer.address();
    if let Some(expected) = settings.wallet_address
        && expected != owner
    {
        return Err(AppError::AccountLoad(format!(
            "signer {owner:#x} does not match configured wallet_address {expected:#x}"
        )));
    }
    tracing::info!(target: "account", owner = %format!("{owner:#x}"), "Signer ready");

    let provider = ConnectionFactory::connect(&rpc_url, profile, signer).await?;
    let gateway: Arc<dyn ContractGateway> = Arc::new(RpcGateway::new(provider));

    let resolver = build_resolver(&settings, profile)?;
    let token_in_handle = resolver
        .resolve(swap_config.token_in, InterfaceKind::Erc20)
        .await?;
    let token_out_handle = resolver
        .resolve(swap_config.token_out, InterfaceKind::Erc20)
        .await?;
    let router = Router::new(
        resolver
            .resolve(swap_config.router, InterfaceKind::SwapRouter)
            .await?,
    );
    let quoter = resolver
        .resolve(swap_config.quoter, InterfaceKind::Quoter)
        .await?;
    tracing::info!(
        target: "resolver",
        token_in = token_in_handle.source,
        token_out = token_out_handle.source,
        router = router.handle.source,
        quoter = quoter.source,
        "Contracts bound"
    );

    let token_in = Token::load(gateway.as_ref(), swap_config.token_in).await?;
    let token_out = Token::load(gateway.as_ref(), swap_config.token_out).await?;
    tracing::info!(
        target: "dca",
        network = profile.name,
        pair = %format!("{} -> {}", token_in.symbol, token_out.symbol),
        fee = %swap_config.fee_tier,
        amount = %swap_config.amount_in_human,
        slippage = %swap_config.slippage_tolerance,
        dry_run = swap_config.dry_run,
        "Starting swap"
    );

    let pipeline = SwapPipeline::new(gateway, swap_config, token_in, token_out, router);
    let invocation = pipeline.run(owner).await;
    let code = invocation.exit_code();
    match &invocation.outcome {
        Ok(result) => tracing::info!(
            target: "dca",
            stage = %invocation.stage,
            events = invocation.events.len(),
            result = %serde_json::to_string(result).unwrap_or_default(),
            success = invocation.is_success(),
            exit_code = code,
            "Swap finished"
        ),
        Err(e) if e.is_recoverable() => tracing::warn!(
            target: "dca",
            stage = %invocation.stage,
            error = %e,
            exit_code = code,
            "Swap skipped"
        ),
        Err(e) => tracing::error!(
            target: "dca",
            stage = %invocation.stage,
            error = %e,
            exit_code = code,
            "Swap aborted"
        ),
    }
    Ok(code)
}

/// Local registry first (builtins, optional ABI dir, known deployments), then
/// the block explorer.
fn build_resolver(
    settings: &GlobalSettings,
    profile: &NetworkProfile,
) -> Result<FallbackResolver, AppError> {
    let mut registry = AbiRegistry::with_builtins()?;
    if let Some(dir) = settings.abi_dir_value() {
        registry.load_from_directory(&dir)?;
    }
    let local = LocalAbiResolver::new(registry).with_network_defaults(profile);

    let explorer = ExplorerAbiResolver::new(
        settings.explorer_api_url_value()?,
        settings.etherscan_api_key_value(),
    )?;
    Ok(FallbackResolver::new(Box::new(local)).or_else(Box::new(explorer)))
}
