// src/blockchain/chain.rs

use serde::Serialize;

/// Chain id used when `CHAIN_ID` is not configured (a local Anvil/Hardhat node).
pub const DEFAULT_CHAIN_ID: u64 = 31337;
pub const DEFAULT_CHAIN_NAME: &str = "Anvil";

/// Well-known Multicall3 deployment address, identical on most EVM chains.
pub const MULTICALL3_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// The network this server talks to. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainIdentity {
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub multicall3: Option<&'static str>,
}

impl ChainIdentity {
    pub fn new(id: u64, name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            native_currency: NativeCurrency::default(),
            rpc_urls: vec![rpc_url.into()],
            multicall3: Some(MULTICALL3_ADDRESS),
        }
    }

    /// The primary RPC endpoint.
    pub fn rpc_url(&self) -> &str {
        self.rpc_urls.first().map(String::as_str).unwrap_or_default()
    }
}
