// src/blockchain/mod.rs

pub mod chain;
pub mod client;
pub use client::{ChainClients, SigningClient};

pub mod models;
pub mod services;

// Re-export commonly used types
pub use ethers::{
    types::{Address, H256, U256},
    utils::to_checksum,
};
