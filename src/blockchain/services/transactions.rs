// src/blockchain/services/transactions.rs

use ethers_core::types::{Address, TransactionRequest, H256, U256};
use ethers_providers::{JsonRpcClient, Middleware};
use ethers_signers::Signer;
use tracing::info;

use crate::blockchain::{client::SigningClient, models::ToolError};

/// Signs and broadcasts `tx`, returning the transaction hash.
///
/// Nonce, gas limit and gas price are filled in by the signing middleware from
/// the node. The call returns as soon as the node accepts the raw transaction.
pub async fn broadcast<P>(client: &SigningClient<P>, tx: TransactionRequest) -> Result<H256, ToolError>
where
    P: JsonRpcClient + Clone + 'static,
{
    let from = client.signer().address();
    let pending = client.send_transaction(tx, None).await?;
    let tx_hash = *pending;
    info!("Broadcast transaction {:#x} from {:?}", tx_hash, from);
    Ok(tx_hash)
}

/// Plain value transfer of `value` wei to `to`.
pub async fn send_value<P>(client: &SigningClient<P>, to: Address, value: U256) -> Result<H256, ToolError>
where
    P: JsonRpcClient + Clone + 'static,
{
    broadcast(client, TransactionRequest::new().to(to).value(value)).await
}
