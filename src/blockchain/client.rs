//! Chain client provider.
//!
//! Owns the single read-only provider used by every query tool and builds a
//! fresh signing client for each write call. Signing clients are never cached,
//! so a derived account does not outlive the call that needed it.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use ethers::middleware::SignerMiddleware;
use ethers_providers::{Http, JsonRpcClient, Provider};
use ethers_signers::{LocalWallet, Signer};
use secrecy::{ExposeSecret, SecretString};

use crate::blockchain::{chain::ChainIdentity, models::ToolError};

/// Signing client bound to the process RPC transport and chain id.
pub type SigningClient<P = Http> = SignerMiddleware<Provider<P>, LocalWallet>;

#[derive(Debug, Clone)]
pub struct ChainClients<P = Http> {
    read: Arc<Provider<P>>,
    chain: ChainIdentity,
}

impl ChainClients<Http> {
    /// Builds the HTTP read client. No request is sent until the first tool call.
    pub fn new(chain: ChainIdentity) -> Result<Self> {
        let provider = create_provider(chain.rpc_url())?;
        Ok(Self::from_provider(provider, chain))
    }
}

impl<P: JsonRpcClient + Clone> ChainClients<P> {
    /// Builds the clients over an arbitrary JSON-RPC transport.
    pub fn with_transport(transport: P, chain: ChainIdentity) -> Self {
        Self::from_provider(Provider::new(transport), chain)
    }

    fn from_provider(provider: Provider<P>, chain: ChainIdentity) -> Self {
        Self {
            read: Arc::new(provider),
            chain,
        }
    }

    /// The shared read client.
    pub fn read_client(&self) -> &Provider<P> {
        &self.read
    }

    pub fn chain(&self) -> &ChainIdentity {
        &self.chain
    }

    pub fn rpc_url(&self) -> &str {
        self.chain.rpc_url()
    }

    /// Derives the account for `private_key` and wraps the transport in a signer.
    pub fn signing_client(&self, private_key: &SecretString) -> Result<SigningClient<P>, ToolError> {
        let key = private_key.expose_secret().trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let wallet = LocalWallet::from_str(key)
            .map_err(|e| ToolError::InvalidKey(e.to_string()))?
            .with_chain_id(self.chain.id);
        tracing::debug!("Signing client ready for {:?}", wallet.address());
        Ok(SignerMiddleware::new((*self.read).clone(), wallet))
    }
}

/// Create a provider for the given RPC URL
pub fn create_provider(rpc_url: &str) -> Result<Provider<Http>> {
    Provider::<Http>::try_from(rpc_url)
        .map_err(|e| anyhow::anyhow!("Failed to create provider: {}", e))
}
