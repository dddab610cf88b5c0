// src/lib.rs

use std::sync::Arc;

use ethers_providers::Http;

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256};

pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod utils;

/// Application state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState<P = Http> {
    /// Application configuration, including the optional signing key
    pub config: Arc<config::Config>,
    /// Read client plus factory for per-call signing clients
    pub clients: blockchain::client::ChainClients<P>,
}

impl<P> AppState<P> {
    pub fn new(config: config::Config, clients: blockchain::client::ChainClients<P>) -> Self {
        Self {
            config: Arc::new(config),
            clients,
        }
    }
}
