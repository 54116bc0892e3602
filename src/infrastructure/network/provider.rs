// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::domain::constants::NetworkProfile;
use alloy::network::{Ethereum, EthereumWallet};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use url::Url;

/// Provider with nonce/gas/chain-id fillers and the owner's wallet attached.
pub type SignerProvider = DynProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    fn parse_url(rpc_url: &str) -> Result<Url, AppError> {
        Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))
    }

    pub fn with_signer(rpc_url: &str, signer: PrivateKeySigner) -> Result<SignerProvider, AppError> {
        let url = Self::parse_url(rpc_url)?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);
        Ok(provider.erased())
    }

    /// Connects and checks that the endpoint serves the profile's chain.
    pub async fn connect(
        rpc_url: &str,
        profile: &NetworkProfile,
        signer: PrivateKeySigner,
    ) -> Result<SignerProvider, AppError> {
        let provider = Self::with_signer(rpc_url, signer)?;
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| AppError::Connection(format!("chain_id query failed: {e}")))?;
        if chain_id != profile.chain_id {
            return Err(AppError::Connection(format!(
                "RPC serves chain {} but network profile {} expects {}",
                chain_id, profile.name, profile.chain_id
            )));
        }
        tracing::info!(target: "rpc", network = profile.name, chain_id, "RPC connected");
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_a_config_error() {
        let err = ConnectionFactory::with_signer("::", PrivateKeySigner::random()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn signer_provider_builds_without_network() {
        assert!(
            ConnectionFactory::with_signer("http://127.0.0.1:8545", PrivateKeySigner::random())
                .is_ok()
        );
    }
}
