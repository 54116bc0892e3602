// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::sol;
use alloy_json_abi::JsonAbi;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract ERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function name() external view returns (string);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract UniV3Quoter {
        function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) external returns (uint256 amountOut);
    }

    // SwapRouter02 (IV3SwapRouter): the deadline lives on multicall, not in the params.
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract SwapRouter02 {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }
        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
        function multicall(uint256 deadline, bytes[] calldata data) external payable returns (bytes[] memory results);
    }
}

/// Which calls a resolved contract has to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    Erc20,
    Quoter,
    SwapRouter,
}

impl InterfaceKind {
    pub fn required_functions(self) -> &'static [&'static str] {
        match self {
            InterfaceKind::Erc20 => &[
                "balanceOf",
                "allowance",
                "approve",
                "decimals",
                "symbol",
                "name",
            ],
            InterfaceKind::Quoter => &["quoteExactInputSingle"],
            InterfaceKind::SwapRouter => &["exactInputSingle", "multicall"],
        }
    }

    pub fn registry_name(self) -> &'static str {
        match self {
            InterfaceKind::Erc20 => "erc20",
            InterfaceKind::Quoter => "uniswap_v3_quoter",
            InterfaceKind::SwapRouter => "uniswap_v3_swaprouter02",
        }
    }

    fn builtin_signatures(self) -> &'static [&'static str] {
        match self {
            InterfaceKind::Erc20 => &[
                "function balanceOf(address owner) view returns (uint256)",
                "function allowance(address owner, address spender) view returns (uint256)",
                "function approve(address spender, uint256 amount) returns (bool)",
                "function decimals() view returns (uint8)",
                "function symbol() view returns (string)",
                "function name() view returns (string)",
            ],
            InterfaceKind::Quoter => &[
                "function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) returns (uint256 amountOut)",
            ],
            InterfaceKind::SwapRouter => &[
                "function exactInputSingle((address,address,uint24,address,uint256,uint256,uint160) params) payable returns (uint256 amountOut)",
                "function multicall(uint256 deadline, bytes[] data) payable returns (bytes[] results)",
            ],
        }
    }
}

/// Returns the names from `kind.required_functions()` that `abi` lacks.
pub fn missing_functions(abi: &JsonAbi, kind: InterfaceKind) -> Vec<&'static str> {
    kind.required_functions()
        .iter()
        .copied()
        .filter(|name| !abi.functions.contains_key(*name))
        .collect()
}

/// Named ABIs known without touching the network.
pub struct AbiRegistry {
    abis: HashMap<String, JsonAbi>,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self {
            abis: HashMap::new(),
        }
    }

    /// Registry preloaded with the interfaces the swap pipeline calls.
    pub fn with_builtins() -> Result<Self, AppError> {
        let mut registry = Self::new();
        for kind in [
            InterfaceKind::Erc20,
            InterfaceKind::Quoter,
            InterfaceKind::SwapRouter,
        ] {
            let abi = JsonAbi::parse(kind.builtin_signatures().iter().copied()).map_err(|e| {
                AppError::Initialization(format!(
                    "Built-in ABI {} failed to parse: {}",
                    kind.registry_name(),
                    e
                ))
            })?;
            registry.insert(kind.registry_name(), abi);
        }
        Ok(registry)
    }

    /// Loads every `*.json` file in `dir_path`; the file stem becomes the
    /// registry name (use the lowercase `0x` address to bind a contract).
    pub fn load_from_directory(&mut self, dir_path: &str) -> Result<(), AppError> {
        let path = Path::new(dir_path);

        if !path.exists() {
            return Err(AppError::Config(format!(
                "ABI directory not found: {}",
                dir_path
            )));
        }

        for entry in fs::read_dir(path).map_err(|e| AppError::Initialization(e.to_string()))? {
            let entry = entry.map_err(|e| AppError::Initialization(e.to_string()))?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let file_stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown")
                    .to_ascii_lowercase();

                let file_content = fs::read_to_string(&path).map_err(|e| {
                    AppError::Config(format!("Failed to read ABI {}: {}", file_stem, e))
                })?;

                let abi: JsonAbi = serde_json::from_str(&file_content).map_err(|e| {
                    AppError::Config(format!("Failed to parse ABI {}: {}", file_stem, e))
                })?;

                tracing::info!(target: "abi", name = %file_stem, "Loaded ABI");
                self.abis.insert(file_stem, abi);
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, name: &str, abi: JsonAbi) {
        self.abis.insert(name.to_ascii_lowercase(), abi);
    }

    pub fn get(&self, name: &str) -> Option<&JsonAbi> {
        self.abis.get(&name.to_ascii_lowercase())
    }
}

impl Default for AbiRegistry {
    fn default() -> Self {
        Self::new()
    }
}
