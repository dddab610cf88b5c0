// src/blockchain/services/mod.rs

pub mod balance;
pub mod contract;
pub mod token;
pub mod transactions;
