// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::types::{FeeTier, SwapInstruction, TxHandle};
use crate::infrastructure::data::abi::{ERC20, SwapRouter02, UniV3Quoter};
use crate::network::provider::SignerProvider;
use alloy::primitives::aliases::{U24, U160};
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionReceipt;
use alloy_sol_types::SolCall;
use async_trait::async_trait;

/// Arguments of a single-pool exact-input quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub fee_tier: FeeTier,
    pub amount_in: U256,
    pub sqrt_price_limit_x96: U256,
}

/// Every chain interaction the swap pipeline performs.
///
/// Read calls never change state. `quote_exact_input_single` must be served
/// as an `eth_call` even though the quoter function is not `view`; sending it
/// as a transaction burns gas for nothing. `approve` and `submit_swap` are
/// signed by `from` and resolve once the receipt is in.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, AppError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, AppError>;

    async fn decimals(&self, token: Address) -> Result<u8, AppError>;

    async fn symbol(&self, token: Address) -> Result<String, AppError>;

    async fn name(&self, token: Address) -> Result<String, AppError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        from: Address,
    ) -> Result<TxHandle, AppError>;

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        request: &QuoteRequest,
    ) -> Result<U256, AppError>;

    async fn submit_swap(
        &self,
        router: Address,
        instruction: &SwapInstruction,
        from: Address,
    ) -> Result<TxHandle, AppError>;
}

/// Calldata for `exactInputSingle`, ready to be wrapped in a multicall.
pub fn encode_exact_input_single(instruction: &SwapInstruction) -> Vec<u8> {
    SwapRouter02::exactInputSingleCall {
        params: SwapRouter02::ExactInputSingleParams {
            tokenIn: instruction.token_in,
            tokenOut: instruction.token_out,
            fee: U24::from(instruction.fee_tier.as_u32()),
            recipient: instruction.recipient,
            amountIn: instruction.amount_in,
            amountOutMinimum: instruction.amount_out_minimum,
            sqrtPriceLimitX96: U160::saturating_from(instruction.sqrt_price_limit_x96),
        },
    }
    .abi_encode()
}

/// Full `multicall(deadline, [exactInputSingle])` calldata sent to the router.
pub fn encode_swap_multicall(instruction: &SwapInstruction) -> Vec<u8> {
    SwapRouter02::multicallCall {
        deadline: U256::from(instruction.deadline),
        data: vec![encode_exact_input_single(instruction).into()],
    }
    .abi_encode()
}

/// Gateway backed by a wallet-enabled JSON-RPC provider.
#[derive(Clone)]
pub struct RpcGateway {
    provider: SignerProvider,
}

impl RpcGateway {
    pub fn new(provider: SignerProvider) -> Self {
        Self { provider }
    }

    fn handle_from_receipt(receipt: &TransactionReceipt) -> TxHandle {
        TxHandle {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

#[async_trait]
impl ContractGateway for RpcGateway {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, AppError> {
        ERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| AppError::Connection(format!("balanceOf {token:#x} failed: {e}")))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, AppError> {
        ERC20::new(token, self.provider.clone())
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| AppError::Connection(format!("allowance {token:#x} failed: {e}")))
    }

    async fn decimals(&self, token: Address) -> Result<u8, AppError> {
        ERC20::new(token, self.provider.clone())
            .decimals()
            .call()
            .await
            .map_err(|e| AppError::Connection(format!("decimals {token:#x} failed: {e}")))
    }

    async fn symbol(&self, token: Address) -> Result<String, AppError> {
        ERC20::new(token, self.provider.clone())
            .symbol()
            .call()
            .await
            .map_err(|e| AppError::Connection(format!("symbol {token:#x} failed: {e}")))
    }

    async fn name(&self, token: Address) -> Result<String, AppError> {
        ERC20::new(token, self.provider.clone())
            .name()
            .call()
            .await
            .map_err(|e| AppError::Connection(format!("name {token:#x} failed: {e}")))
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        from: Address,
    ) -> Result<TxHandle, AppError> {
        let pending = ERC20::new(token, self.provider.clone())
            .approve(spender, amount)
            .from(from)
            .send()
            .await
            .map_err(|e| AppError::Submission(format!("approve send failed: {e}")))?;
        tracing::info!(
            target: "gateway",
            token = %format!("{token:#x}"),
            spender = %format!("{spender:#x}"),
            tx = %format!("{:#x}", pending.tx_hash()),
            "Approval transaction sent"
        );
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AppError::Submission(format!("approve receipt failed: {e}")))?;
        if !receipt.status() {
            return Err(AppError::Submission(format!(
                "approve reverted in tx {:#x}",
                receipt.transaction_hash
            )));
        }
        Ok(Self::handle_from_receipt(&receipt))
    }

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        request: &QuoteRequest,
    ) -> Result<U256, AppError> {
        // `.call()` issues eth_call; nothing is signed or broadcast.
        UniV3Quoter::new(quoter, self.provider.clone())
            .quoteExactInputSingle(
                request.token_in,
                request.token_out,
                U24::from(request.fee_tier.as_u32()),
                request.amount_in,
                U160::saturating_from(request.sqrt_price_limit_x96),
            )
            .call()
            .await
            .map_err(|e| AppError::QuoteUnavailable(e.to_string()))
    }

    async fn submit_swap(
        &self,
        router: Address,
        instruction: &SwapInstruction,
        from: Address,
    ) -> Result<TxHandle, AppError> {
        let payload = encode_exact_input_single(instruction);
        let pending = SwapRouter02::new(router, self.provider.clone())
            .multicall(U256::from(instruction.deadline), vec![payload.into()])
            .from(from)
            .send()
            .await
            .map_err(|e| AppError::Submission(format!("multicall send failed: {e}")))?;
        tracing::info!(
            target: "gateway",
            router = %format!("{router:#x}"),
            tx = %format!("{:#x}", pending.tx_hash()),
            "Swap transaction sent"
        );
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AppError::Submission(format!("swap receipt failed: {e}")))?;
        if !receipt.status() {
            return Err(AppError::Submission(format!(
                "swap reverted in tx {:#x}",
                receipt.transaction_hash
            )));
        }
        Ok(Self::handle_from_receipt(&receipt))
    }
}
