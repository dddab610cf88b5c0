use ethers_core::types::{Address, U256};
use ethers_providers::{JsonRpcClient, Middleware, Provider};
use tracing::debug;

use crate::blockchain::models::ToolError;

/// Native balance of `address` at the latest block, in wei.
pub async fn get_native_balance<P: JsonRpcClient>(
    provider: &Provider<P>,
    address: Address,
) -> Result<U256, ToolError> {
    let balance = provider
        .get_balance(address, None)
        .await
        .map_err(|e| ToolError::chain("eth_getBalance failed", e))?;
    debug!("Balance of {:?}: {} wei", address, balance);
    Ok(balance)
}
