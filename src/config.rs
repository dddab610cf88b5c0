// src/config.rs

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use url::Url;

use crate::blockchain::chain::{ChainIdentity, DEFAULT_CHAIN_ID, DEFAULT_CHAIN_NAME};

/// RPC endpoint used when neither a CLI argument nor `RPC_URL` is given.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

// All configuration, resolved once at startup.
#[derive(Debug)]
pub struct Config {
    /// Resolved RPC endpoint: first CLI argument, then `RPC_URL`, then the local default.
    pub rpc_url: String,
    pub chain: ChainIdentity,
    /// Key for write tools (`PRIVATE_KEY`). Read-only tools work without it.
    pub private_key: Option<SecretString>,
    /// Optional deadline for a single tool call (`RPC_TIMEOUT_SECS`). None waits indefinitely.
    pub rpc_timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from the process arguments and environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        Self::from_sources(env::args().skip(1), |key| env::var(key).ok())
    }

    /// Resolves configuration from positional arguments (program name excluded)
    /// and an environment lookup. Empty values count as unset.
    pub fn from_sources<I, F>(args: I, lookup: F) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpc_url = args
            .into_iter()
            .filter(|a| !a.trim().is_empty())
            .find(|a| !a.starts_with('-'))
            .or_else(|| var("RPC_URL"))
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = rpc_url.trim().to_string();

        let parsed = Url::parse(&rpc_url).with_context(|| format!("Invalid RPC URL '{}'", rpc_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("RPC URL must use http or https, got '{}'", parsed.scheme());
        }

        let chain_id = var("CHAIN_ID")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("CHAIN_ID must be a valid number")?
            .unwrap_or(DEFAULT_CHAIN_ID);
        let chain_name = var("CHAIN_NAME").unwrap_or_else(|| DEFAULT_CHAIN_NAME.to_string());

        let rpc_timeout = match var("RPC_TIMEOUT_SECS") {
            Some(v) => {
                let secs = v
                    .trim()
                    .parse::<u64>()
                    .context("RPC_TIMEOUT_SECS must be a whole number of seconds")?;
                if secs == 0 {
                    bail!("RPC_TIMEOUT_SECS must be greater than zero");
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Config {
            chain: ChainIdentity::new(chain_id, chain_name, rpc_url.clone()),
            rpc_url,
            private_key: var("PRIVATE_KEY").map(SecretString::new),
            rpc_timeout,
        })
    }
}
