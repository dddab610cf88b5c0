// src/blockchain/models.rs
use std::fmt;

use ethers::middleware::signer::SignerMiddlewareError;
use ethers_core::abi;
use ethers_providers::{Middleware, ProviderError};
use ethers_signers::Signer;
use thiserror::Error;

/// A single failed argument constraint, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// --- Error taxonomy for tool calls ---

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {}", join_violations(.0))]
    Validation(Vec<Violation>),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("PRIVATE_KEY environment variable is not set; write tools are unavailable")]
    MissingCredential,
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
    #[error("{0}")]
    ChainRpc(String),
}

impl ToolError {
    /// Validation failure for a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ToolError::Validation(vec![Violation::new(field, message)])
    }

    pub fn chain(context: &str, err: impl fmt::Display) -> Self {
        ToolError::ChainRpc(format!("{context}: {err}"))
    }
}

impl From<ProviderError> for ToolError {
    fn from(err: ProviderError) -> Self {
        ToolError::ChainRpc(err.to_string())
    }
}

impl From<abi::Error> for ToolError {
    fn from(err: abi::Error) -> Self {
        ToolError::chain("ABI error", err)
    }
}

impl<M: Middleware, S: Signer> From<SignerMiddlewareError<M, S>> for ToolError {
    fn from(err: SignerMiddlewareError<M, S>) -> Self {
        ToolError::chain("Transaction failed", err)
    }
}
