// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::constants::{
    CHAIN_ARBITRUM, NetworkProfile, UNISWAP_V3_QUOTER, UNISWAP_V3_SWAP_ROUTER02, USDC_E_ARBITRUM,
    WETH_ARBITRUM,
};
use crate::infrastructure::data::abi::{AbiRegistry, InterfaceKind, missing_functions};
use alloy::primitives::Address;
use alloy_json_abi::JsonAbi;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// A contract address bound to an interface that exposes every call the
/// pipeline needs from it.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    pub address: Address,
    pub kind: InterfaceKind,
    pub abi: JsonAbi,
    /// Which strategy produced the ABI ("registry", "explorer", "explorer-proxy").
    pub source: &'static str,
}

impl ContractHandle {
    pub fn new(
        address: Address,
        kind: InterfaceKind,
        abi: JsonAbi,
        source: &'static str,
    ) -> Result<Self, AppError> {
        let missing = missing_functions(&abi, kind);
        if !missing.is_empty() {
            return Err(AppError::Resolution {
                address: format!("{address:#x}"),
                reason: format!(
                    "{} ABI lacks {} (add an ABI file to abi_dir)",
                    source,
                    missing.join(", ")
                ),
            });
        }
        Ok(Self {
            address,
            kind,
            abi,
            source,
        })
    }
}

/// One way of turning an address into a callable interface.
///
/// `Ok(None)` means "this strategy does not know the contract" and lets the
/// next strategy try; `Err` aborts resolution.
#[async_trait]
pub trait ContractResolver: Send + Sync {
    async fn lookup(
        &self,
        address: Address,
        kind: InterfaceKind,
    ) -> Result<Option<ContractHandle>, AppError>;

    async fn resolve(
        &self,
        address: Address,
        kind: InterfaceKind,
    ) -> Result<ContractHandle, AppError> {
        self.lookup(address, kind)
            .await?
            .ok_or_else(|| AppError::Resolution {
                address: format!("{address:#x}"),
                reason: "no known interface and no verified source on the explorer".into(),
            })
    }
}

/// Resolves well-known deployments and ABI files without network access.
pub struct LocalAbiResolver {
    registry: AbiRegistry,
    known: HashMap<Address, InterfaceKind>,
}

impl LocalAbiResolver {
    pub fn new(registry: AbiRegistry) -> Self {
        Self {
            registry,
            known: HashMap::new(),
        }
    }

    pub fn with_known(mut self, address: Address, kind: InterfaceKind) -> Self {
        self.known.insert(address, kind);
        self
    }

    /// Registers the deployments known to exist on `profile`'s chain. Other
    /// addresses are left to the ABI directory or the explorer.
    pub fn with_network_defaults(mut self, profile: &NetworkProfile) -> Self {
        if profile.uniswap_v3_canonical {
            self = self
                .with_known(UNISWAP_V3_SWAP_ROUTER02, InterfaceKind::SwapRouter)
                .with_known(UNISWAP_V3_QUOTER, InterfaceKind::Quoter);
        }
        if profile.chain_id == CHAIN_ARBITRUM {
            self = self
                .with_known(USDC_E_ARBITRUM, InterfaceKind::Erc20)
                .with_known(WETH_ARBITRUM, InterfaceKind::Erc20);
        }
        self
    }
}

#[async_trait]
impl ContractResolver for LocalAbiResolver {
    async fn lookup(
        &self,
        address: Address,
        kind: InterfaceKind,
    ) -> Result<Option<ContractHandle>, AppError> {
        // An ABI file named after the address wins over the built-in interface.
        if let Some(abi) = self.registry.get(&format!("{address:#x}")) {
            return ContractHandle::new(address, kind, abi.clone(), "registry").map(Some);
        }
        match self.known.get(&address) {
            Some(known_kind) if *known_kind == kind => {
                let abi = self.registry.get(kind.registry_name()).ok_or_else(|| {
                    AppError::Initialization(format!(
                        "ABI registry has no {} interface",
                        kind.registry_name()
                    ))
                })?;
                ContractHandle::new(address, kind, abi.clone(), "registry").map(Some)
            }
            Some(known_kind) => Err(AppError::Resolution {
                address: format!("{address:#x}"),
                reason: format!("known as {known_kind:?}, requested as {kind:?}"),
            }),
            None => Ok(None),
        }
    }
}

/// GET transport for explorer queries; returns the response body.
#[async_trait]
pub trait ExplorerTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, AppError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Initialization(format!("Explorer client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ExplorerTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("explorer request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::Connection(format!(
                "explorer responded with {}",
                resp.status()
            )));
        }
        resp.text()
            .await
            .map_err(|e| AppError::Connection(format!("explorer body unreadable: {e}")))
    }
}

/// Fetches verified ABIs from an Etherscan-compatible API.
///
/// Upgradeable tokens (USDC's `FiatTokenProxy` and friends) verify only the
/// proxy's admin surface. When that ABI lacks the required calls, the
/// explorer's `getsourcecode` record names the implementation, whose ABI is
/// validated instead and bound to the proxy address.
pub struct ExplorerAbiResolver {
    transport: Box<dyn ExplorerTransport>,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExplorerAbiResponse {
    #[serde(default)]
    status: Option<String>,
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExplorerSourceResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

impl ExplorerAbiResolver {
    pub fn new(api_url: String, api_key: Option<String>) -> Result<Self, AppError> {
        let transport = HttpTransport::new(Duration::from_secs(8))?;
        Ok(Self::with_transport(api_url, api_key, Box::new(transport)))
    }

    pub fn with_transport(
        api_url: String,
        api_key: Option<String>,
        transport: Box<dyn ExplorerTransport>,
    ) -> Self {
        Self {
            transport,
            api_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn request_url(&self, action: &str, address: Address) -> String {
        let mut url = format!(
            "{}?module=contract&action={}&address={:#x}",
            self.api_url.trim_end_matches('/'),
            action,
            address
        );
        if let Some(key) = &self.api_key {
            url.push_str("&apikey=");
            url.push_str(key);
        }
        url
    }

    async fn query(&self, action: &str, address: Address) -> Result<String, AppError> {
        self.transport
            .get(&self.request_url(action, address))
            .await
            .map_err(|e| AppError::Resolution {
                address: format!("{address:#x}"),
                reason: e.to_string(),
            })
    }

    async fn fetch_abi(&self, address: Address) -> Result<Option<JsonAbi>, AppError> {
        let body = self.query("getabi", address).await?;
        parse_explorer_response(&body)
    }

    async fn fetch_implementation(&self, address: Address) -> Result<Option<Address>, AppError> {
        let body = self.query("getsourcecode", address).await?;
        parse_source_implementation(&body)
    }
}

/// Extract the ABI from an explorer response body. Unverified or malformed
/// entries yield `None`.
pub fn parse_explorer_response(body: &str) -> Result<Option<JsonAbi>, AppError> {
    let parsed: ExplorerAbiResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Initialization(format!("Explorer ABI decode failed: {e}")))?;
    if parsed.status.as_deref() == Some("0") {
        return Ok(None);
    }
    let Some(abi_json) = parsed.result else {
        return Ok(None);
    };
    if abi_json.contains("not verified") {
        return Ok(None);
    }
    Ok(serde_json::from_str::<JsonAbi>(&abi_json).ok())
}

/// Implementation address from a `getsourcecode` body, if the explorer
/// flags the contract as a proxy. Empty or zero entries yield `None`.
pub fn parse_source_implementation(body: &str) -> Result<Option<Address>, AppError> {
    let parsed: ExplorerSourceResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Initialization(format!("Explorer source decode failed: {e}")))?;
    if parsed.status.as_deref() == Some("0") {
        return Ok(None);
    }
    let implementation = parsed
        .result
        .get(0)
        .and_then(|entry| entry.get("Implementation"))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if implementation.is_empty() {
        return Ok(None);
    }
    Ok(Address::from_str(implementation)
        .ok()
        .filter(|addr| !addr.is_zero()))
}

#[async_trait]
impl ContractResolver for ExplorerAbiResolver {
    async fn lookup(
        &self,
        address: Address,
        kind: InterfaceKind,
    ) -> Result<Option<ContractHandle>, AppError> {
        let Some(abi) = self.fetch_abi(address).await? else {
            return Ok(None);
        };
        if missing_functions(&abi, kind).is_empty() {
            tracing::info!(
                target: "resolver",
                address = %format!("{address:#x}"),
                functions = abi.functions.len(),
                "Fetched ABI from explorer"
            );
            return ContractHandle::new(address, kind, abi, "explorer").map(Some);
        }

        if let Some(implementation) = self.fetch_implementation(address).await?
            && implementation != address
            && let Some(impl_abi) = self.fetch_abi(implementation).await?
        {
            tracing::info!(
                target: "resolver",
                proxy = %format!("{address:#x}"),
                implementation = %format!("{implementation:#x}"),
                functions = impl_abi.functions.len(),
                "Resolved proxy through implementation ABI"
            );
            return ContractHandle::new(address, kind, impl_abi, "explorer-proxy").map(Some);
        }
        // Not a proxy the explorer knows; report what the proxy ABI lacks.
        ContractHandle::new(address, kind, abi, "explorer").map(Some)
    }
}

/// Tries `primary`, then `fallback` when the primary does not know the address.
pub struct FallbackResolver {
    primary: Box<dyn ContractResolver>,
    fallback: Option<Box<dyn ContractResolver>>,
}

impl FallbackResolver {
    pub fn new(primary: Box<dyn ContractResolver>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn or_else(mut self, fallback: Box<dyn ContractResolver>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl ContractResolver for FallbackResolver {
    async fn lookup(
        &self,
        address: Address,
        kind: InterfaceKind,
    ) -> Result<Option<ContractHandle>, AppError> {
        if let Some(handle) = self.primary.lookup(address, kind).await? {
            return Ok(Some(handle));
        }
        match &self.fallback {
            Some(fallback) => fallback.lookup(address, kind).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::network_profile;
    use std::sync::{Arc, Mutex};

    fn local() -> LocalAbiResolver {
        LocalAbiResolver::new(AbiRegistry::with_builtins().expect("builtins"))
            .with_known(USDC_E_ARBITRUM, InterfaceKind::Erc20)
            .with_known(UNISWAP_V3_QUOTER, InterfaceKind::Quoter)
    }

    struct Fixed(Option<JsonAbi>);

    #[async_trait]
    impl ContractResolver for Fixed {
        async fn lookup(
            &self,
            address: Address,
            kind: InterfaceKind,
        ) -> Result<Option<ContractHandle>, AppError> {
            match &self.0 {
                Some(abi) => ContractHandle::new(address, kind, abi.clone(), "explorer").map(Some),
                None => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn local_resolver_binds_known_deployments() {
        let handle = local()
            .resolve(USDC_E_ARBITRUM, InterfaceKind::Erc20)
            .await
            .expect("resolve");
        assert_eq!(handle.address, USDC_E_ARBITRUM);
        assert_eq!(handle.source, "registry");
    }

    #[tokio::test]
    async fn local_resolver_rejects_kind_mismatch() {
        let err = local()
            .resolve(UNISWAP_V3_QUOTER, InterfaceKind::SwapRouter)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Resolution { .. }));
    }

    #[tokio::test]
    async fn uniswap_defaults_follow_the_network() {
        let registry = || AbiRegistry::with_builtins().expect("builtins");
        let arbitrum = LocalAbiResolver::new(registry())
            .with_network_defaults(network_profile("arbitrum-main").expect("profile"));
        let handle = arbitrum
            .lookup(UNISWAP_V3_SWAP_ROUTER02, InterfaceKind::SwapRouter)
            .await
            .expect("lookup");
        assert!(handle.is_some());
        assert!(
            arbitrum
                .lookup(WETH_ARBITRUM, InterfaceKind::Erc20)
                .await
                .expect("lookup")
                .is_some()
        );

        let base = LocalAbiResolver::new(registry())
            .with_network_defaults(network_profile("base-main").expect("profile"));
        for (address, kind) in [
            (UNISWAP_V3_SWAP_ROUTER02, InterfaceKind::SwapRouter),
            (UNISWAP_V3_QUOTER, InterfaceKind::Quoter),
            (USDC_E_ARBITRUM, InterfaceKind::Erc20),
        ] {
            assert!(base.lookup(address, kind).await.expect("lookup").is_none());
        }
    }

    #[tokio::test]
    async fn unknown_address_falls_through_to_fallback() {
        let unknown = Address::from([7u8; 20]);
        let abi = AbiRegistry::with_builtins()
            .expect("builtins")
            .get(InterfaceKind::SwapRouter.registry_name())
            .cloned();
        let resolver = FallbackResolver::new(Box::new(local())).or_else(Box::new(Fixed(abi)));
        let handle = resolver
            .resolve(unknown, InterfaceKind::SwapRouter)
            .await
            .expect("resolve");
        assert_eq!(handle.source, "explorer");
    }

    #[tokio::test]
    async fn unresolvable_address_is_a_resolution_error() {
        let resolver = FallbackResolver::new(Box::new(local())).or_else(Box::new(Fixed(None)));
        let err = resolver
            .resolve(Address::from([8u8; 20]), InterfaceKind::Erc20)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Resolution { .. }));
    }

    #[tokio::test]
    async fn incomplete_abi_is_a_resolution_error() {
        let proxy_abi = JsonAbi::parse(["function upgradeTo(address newImplementation)"])
            .expect("parse");
        let resolver = FallbackResolver::new(Box::new(local()))
            .or_else(Box::new(Fixed(Some(proxy_abi))));
        let err = resolver
            .resolve(Address::from([9u8; 20]), InterfaceKind::Erc20)
            .await
            .unwrap_err();
        match err {
            AppError::Resolution { reason, .. } => assert!(reason.contains("balanceOf")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn explorer_unverified_source_yields_none() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Contract source code not verified"}"#;
        assert!(parse_explorer_response(body).expect("parse").is_none());
    }

    #[test]
    fn explorer_verified_abi_is_parsed() {
        let body = r#"{"status":"1","message":"OK","result":"[{\"type\":\"function\",\"name\":\"quoteExactInputSingle\",\"inputs\":[{\"name\":\"tokenIn\",\"type\":\"address\"},{\"name\":\"tokenOut\",\"type\":\"address\"},{\"name\":\"fee\",\"type\":\"uint24\"},{\"name\":\"amountIn\",\"type\":\"uint256\"},{\"name\":\"sqrtPriceLimitX96\",\"type\":\"uint160\"}],\"outputs\":[{\"name\":\"amountOut\",\"type\":\"uint256\"}],\"stateMutability\":\"nonpayable\"}]"}"#;
        let abi = parse_explorer_response(body)
            .expect("parse")
            .expect("abi present");
        assert!(missing_functions(&abi, InterfaceKind::Quoter).is_empty());
    }

    #[test]
    fn explorer_url_includes_key_only_when_set() {
        let with_key =
            ExplorerAbiResolver::new("https://api.arbiscan.io/api/".into(), Some("KEY".into()))
                .expect("client");
        let url = with_key.request_url("getabi", Address::ZERO);
        assert!(url.starts_with("https://api.arbiscan.io/api?module=contract&action=getabi"));
        assert!(url.ends_with("&apikey=KEY"));

        let without = ExplorerAbiResolver::new("https://api.arbiscan.io/api".into(), Some(" ".into()))
            .expect("client");
        assert!(!without.request_url("getabi", Address::ZERO).contains("apikey"));
    }

    #[test]
    fn source_record_names_the_implementation() {
        let body = r#"{"status":"1","message":"OK","result":[{"ContractName":"FiatTokenProxy","Proxy":"1","Implementation":"0x0606060606060606060606060606060606060606"}]}"#;
        assert_eq!(
            parse_source_implementation(body).expect("parse"),
            Some(Address::from([6u8; 20]))
        );

        let plain = r#"{"status":"1","message":"OK","result":[{"ContractName":"WETH9","Proxy":"0","Implementation":""}]}"#;
        assert_eq!(parse_source_implementation(plain).expect("parse"), None);
    }

    /// Serves canned explorer bodies keyed on `(action, address)`.
    struct CannedExplorer {
        bodies: Vec<(&'static str, Address, String)>,
        requests: Mutex<Vec<String>>,
    }

    impl CannedExplorer {
        fn new() -> Self {
            Self {
                bodies: Vec::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn with(mut self, action: &'static str, address: Address, body: String) -> Self {
            self.bodies.push((action, address, body));
            self
        }
    }

    #[async_trait]
    impl ExplorerTransport for Arc<CannedExplorer> {
        async fn get(&self, url: &str) -> Result<String, AppError> {
            self.requests.lock().expect("lock").push(url.to_string());
            self.bodies
                .iter()
                .find(|(action, address, _)| {
                    url.contains(&format!("action={action}&"))
                        && url.contains(&format!("address={address:#x}"))
                })
                .map(|(_, _, body)| body.clone())
                .ok_or_else(|| AppError::Connection(format!("no canned body for {url}")))
        }
    }

    fn abi_body(abi: &JsonAbi) -> String {
        serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": serde_json::to_string(abi).expect("serialize abi"),
        })
        .to_string()
    }

    fn fiat_token_proxy_abi() -> JsonAbi {
        JsonAbi::parse([
            "function implementation() view returns (address)",
            "function upgradeTo(address newImplementation)",
            "function admin() view returns (address)",
            "function changeAdmin(address newAdmin)",
        ])
        .expect("parse")
    }

    #[tokio::test]
    async fn proxy_token_resolves_through_its_implementation() {
        let proxy = Address::from([5u8; 20]);
        let implementation = Address::from([6u8; 20]);
        let erc20 = AbiRegistry::with_builtins()
            .expect("builtins")
            .get(InterfaceKind::Erc20.registry_name())
            .cloned()
            .expect("erc20 builtin");

        let explorer = Arc::new(
            CannedExplorer::new()
                .with("getabi", proxy, abi_body(&fiat_token_proxy_abi()))
                .with(
                    "getsourcecode",
                    proxy,
                    format!(
                        r#"{{"status":"1","message":"OK","result":[{{"Proxy":"1","Implementation":"{implementation:#x}"}}]}}"#
                    ),
                )
                .with("getabi", implementation, abi_body(&erc20)),
        );
        let resolver = ExplorerAbiResolver::with_transport(
            "https://api.etherscan.io/api".into(),
            None,
            Box::new(explorer.clone()),
        );

        let handle = resolver
            .resolve(proxy, InterfaceKind::Erc20)
            .await
            .expect("resolve");
        assert_eq!(handle.address, proxy);
        assert_eq!(handle.source, "explorer-proxy");
        assert!(missing_functions(&handle.abi, InterfaceKind::Erc20).is_empty());
        assert_eq!(explorer.requests.lock().expect("lock").len(), 3);
    }

    #[tokio::test]
    async fn proxy_without_implementation_is_a_resolution_error() {
        let proxy = Address::from([5u8; 20]);
        let explorer = Arc::new(
            CannedExplorer::new()
                .with("getabi", proxy, abi_body(&fiat_token_proxy_abi()))
                .with(
                    "getsourcecode",
                    proxy,
                    r#"{"status":"1","message":"OK","result":[{"Proxy":"0","Implementation":""}]}"#
                        .to_string(),
                ),
        );
        let resolver = ExplorerAbiResolver::with_transport(
            "https://api.etherscan.io/api".into(),
            None,
            Box::new(explorer),
        );

        let err = resolver
            .resolve(proxy, InterfaceKind::Erc20)
            .await
            .unwrap_err();
        match err {
            AppError::Resolution { reason, .. } => assert!(reason.contains("balanceOf")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
