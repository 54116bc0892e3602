// SPDX-License-Identifier: MIT
#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use oxidity_dca::app::config::SwapConfig;
use oxidity_dca::domain::error::AppError;
use oxidity_dca::domain::types::{FeeTier, Router, SwapInstruction, Token, TxHandle};
use oxidity_dca::infrastructure::data::abi::{AbiRegistry, InterfaceKind};
use oxidity_dca::infrastructure::data::gateway::{ContractGateway, QuoteRequest};
use oxidity_dca::infrastructure::data::resolver::ContractHandle;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

pub const OWNER: Address = Address::new([0x99; 20]);
pub const USDC: Address = Address::new([0x11; 20]);
pub const WETH: Address = Address::new([0x22; 20]);
pub const ROUTER: Address = Address::new([0x33; 20]);
pub const QUOTER: Address = Address::new([0x44; 20]);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Calls {
    pub balance_of: usize,
    pub allowance: usize,
    pub approve: Vec<(Address, Address, U256)>,
    pub quote: Vec<QuoteRequest>,
    pub submit: Vec<SwapInstruction>,
}

#[derive(Default)]
struct State {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    quote: Option<Result<U256, String>>,
    submit_error: Option<String>,
    approve_error: Option<String>,
    calls: Calls,
}

/// In-memory chain: balances, allowances and scripted quote/submit results.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<State>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, token: Address, amount: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(token, U256::from(amount));
        self
    }

    pub fn with_allowance(self, token: Address, spender: Address, amount: U256) -> Self {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, spender), amount);
        self
    }

    pub fn with_quote(self, amount_out: u64) -> Self {
        self.state.lock().unwrap().quote = Some(Ok(U256::from(amount_out)));
        self
    }

    pub fn with_quote_revert(self, reason: &str) -> Self {
        self.state.lock().unwrap().quote = Some(Err(reason.to_string()));
        self
    }

    pub fn with_submit_error(self, reason: &str) -> Self {
        self.state.lock().unwrap().submit_error = Some(reason.to_string());
        self
    }

    pub fn with_approve_error(self, reason: &str) -> Self {
        self.state.lock().unwrap().approve_error = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn allowance_of(&self, token: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .allowances
            .get(&(token, spender))
            .copied()
            .unwrap_or_default()
    }
}

fn tx(seed: u8) -> TxHandle {
    TxHandle {
        hash: B256::repeat_byte(seed),
        block_number: Some(1),
        gas_used: 21_000,
    }
}

#[async_trait]
impl ContractGateway for MockGateway {
    async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256, AppError> {
        let mut state = self.state.lock().unwrap();
        state.calls.balance_of += 1;
        Ok(state.balances.get(&token).copied().unwrap_or_default())
    }

    async fn allowance(
        &self,
        token: Address,
        _owner: Address,
        spender: Address,
    ) -> Result<U256, AppError> {
        let mut state = self.state.lock().unwrap();
        state.calls.allowance += 1;
        Ok(state
            .allowances
            .get(&(token, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn decimals(&self, token: Address) -> Result<u8, AppError> {
        Ok(if token == USDC { 6 } else { 18 })
    }

    async fn symbol(&self, token: Address) -> Result<String, AppError> {
        Ok(if token == USDC { "USDC" } else { "WETH" }.to_string())
    }

    async fn name(&self, token: Address) -> Result<String, AppError> {
        self.symbol(token).await
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        _from: Address,
    ) -> Result<TxHandle, AppError> {
        let mut state = self.state.lock().unwrap();
        state.calls.approve.push((token, spender, amount));
        if let Some(reason) = &state.approve_error {
            return Err(AppError::Submission(reason.clone()));
        }
        state.allowances.insert((token, spender), amount);
        Ok(tx(0xaa))
    }

    async fn quote_exact_input_single(
        &self,
        _quoter: Address,
        request: &QuoteRequest,
    ) -> Result<U256, AppError> {
        let mut state = self.state.lock().unwrap();
        state.calls.quote.push(*request);
        match &state.quote {
            Some(Ok(amount)) => Ok(*amount),
            Some(Err(reason)) => Err(AppError::QuoteUnavailable(reason.clone())),
            None => Err(AppError::QuoteUnavailable("no pool".into())),
        }
    }

    async fn submit_swap(
        &self,
        _router: Address,
        instruction: &SwapInstruction,
        _from: Address,
    ) -> Result<TxHandle, AppError> {
        let mut state = self.state.lock().unwrap();
        state.calls.submit.push(instruction.clone());
        match &state.submit_error {
            Some(reason) => Err(AppError::Submission(reason.clone())),
            None => Ok(tx(0xbb)),
        }
    }
}

pub fn usdc() -> Token {
    Token {
        address: USDC,
        decimals: 6,
        symbol: "USDC".into(),
        name: "USD Coin".into(),
    }
}

pub fn weth() -> Token {
    Token {
        address: WETH,
        decimals: 18,
        symbol: "WETH".into(),
        name: "Wrapped Ether".into(),
    }
}

pub fn router() -> Router {
    let abi = AbiRegistry::with_builtins()
        .expect("builtins")
        .get(InterfaceKind::SwapRouter.registry_name())
        .cloned()
        .expect("router abi");
    Router::new(ContractHandle::new(ROUTER, InterfaceKind::SwapRouter, abi, "test").expect("handle"))
}

pub fn swap_config(dry_run: bool) -> SwapConfig {
    SwapConfig {
        token_in: USDC,
        token_out: WETH,
        router: ROUTER,
        quoter: QUOTER,
        fee_tier: FeeTier::Low,
        amount_in_human: Decimal::from(2),
        slippage_tolerance: Decimal::from_str("0.01").unwrap(),
        deadline_secs: 30,
        dry_run,
        verbose: true,
    }
}
