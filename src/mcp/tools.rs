//! Tool handlers: act on validated arguments and format the text reply.
//!
//! Read tools only use the shared read client. Write tools take the signing
//! credential explicitly and resolve it before any chain interaction, so a
//! missing or malformed key never produces an RPC request.

use ethers_core::types::U256;
use ethers_providers::JsonRpcClient;
use secrecy::SecretString;
use tracing::info;

use crate::blockchain::{
    client::{ChainClients, SigningClient},
    models::ToolError,
    services::{balance, contract, token, transactions},
};
use crate::mcp::protocol::CallToolResult;
use crate::mcp::schema::{
    CallContractArgs, Erc20AllowanceArgs, Erc20ApproveArgs, Erc20BalanceArgs, Erc20TransferArgs,
    EthBalanceArgs, SendEthArgs,
};
use crate::utils::{amount_to_raw, raw_to_amount};

const ETHER_DECIMALS: u32 = 18;

fn token_amount_text(raw: U256, decimals: u32) -> String {
    format!("{} tokens ({} raw)", raw_to_amount(raw, decimals), raw)
}

fn signer<P: JsonRpcClient + Clone>(
    clients: &ChainClients<P>,
    credential: Option<&SecretString>,
) -> Result<SigningClient<P>, ToolError> {
    let key = credential.ok_or(ToolError::MissingCredential)?;
    clients.signing_client(key)
}

pub async fn get_eth_balance<P: JsonRpcClient + Clone>(
    clients: &ChainClients<P>,
    args: EthBalanceArgs,
) -> Result<CallToolResult, ToolError> {
    let wei = balance::get_native_balance(clients.read_client(), args.address).await?;
    Ok(CallToolResult::text(raw_to_amount(wei, args.unit.decimals())))
}

pub async fn get_erc20_balance<P: JsonRpcClient + Clone>(
    clients: &ChainClients<P>,
    args: Erc20BalanceArgs,
) -> Result<CallToolResult, ToolError> {
    let provider = clients.read_client();
    let (raw, decimals) = tokio::try_join!(
        token::erc20_balance_of(provider, args.token_address, args.account_address),
        token::erc20_decimals(provider, args.token_address),
    )?;
    Ok(CallToolResult::text(token_amount_text(raw, decimals)))
}

pub async fn erc20_allowance<P: JsonRpcClient + Clone>(
    clients: &ChainClients<P>,
    args: Erc20AllowanceArgs,
) -> Result<CallToolResult, ToolError> {
    let provider = clients.read_client();
    let (raw, decimals) = tokio::try_join!(
        token::erc20_allowance(provider, args.token_address, args.owner, args.spender),
        token::erc20_decimals(provider, args.token_address),
    )?;
    Ok(CallToolResult::text(token_amount_text(raw, decimals)))
}

pub async fn call_contract<P: JsonRpcClient + Clone>(
    clients: &ChainClients<P>,
    args: CallContractArgs,
) -> Result<CallToolResult, ToolError> {
    let abi = contract::parse_abi(&args.abi)?;
    let result = contract::read_contract(
        clients.read_client(),
        args.address,
        &abi,
        &args.function_name,
        &args.args,
    )
    .await?;
    let text = serde_json::to_string(&result).map_err(|e| ToolError::chain("Failed to encode result", e))?;
    Ok(CallToolResult::text(text))
}

pub async fn send_eth<P: JsonRpcClient + Clone + 'static>(
    clients: &ChainClients<P>,
    credential: Option<&SecretString>,
    args: SendEthArgs,
) -> Result<CallToolResult, ToolError> {
    let client = signer(clients, credential)?;
    let value = amount_to_raw("amountEth", &args.amount_eth, ETHER_DECIMALS)?;
    info!("Sending {} wei to {:?}", value, args.to);
    let tx_hash = transactions::send_value(&client, args.to, value).await?;
    Ok(CallToolResult::text(format!("{tx_hash:#x}")))
}

pub async fn erc20_transfer<P: JsonRpcClient + Clone + 'static>(
    clients: &ChainClients<P>,
    credential: Option<&SecretString>,
    args: Erc20TransferArgs,
) -> Result<CallToolResult, ToolError> {
    let client = signer(clients, credential)?;
    let decimals = token::erc20_decimals(clients.read_client(), args.token_address).await?;
    let amount = amount_to_raw("amount", &args.amount, decimals)?;
    info!("Transferring {} raw units of {:?} to {:?}", amount, args.token_address, args.to);
    let tx = token::erc20_transfer_tx(args.token_address, args.to, amount);
    let tx_hash = transactions::broadcast(&client, tx).await?;
    Ok(CallToolResult::text(format!("{tx_hash:#x}")))
}

pub async fn erc20_approve<P: JsonRpcClient + Clone + 'static>(
    clients: &ChainClients<P>,
    credential: Option<&SecretString>,
    args: Erc20ApproveArgs,
) -> Result<CallToolResult, ToolError> {
    let client = signer(clients, credential)?;
    let decimals = token::erc20_decimals(clients.read_client(), args.token_address).await?;
    let amount = amount_to_raw("amount", &args.amount, decimals)?;
    info!("Approving {:?} for {} raw units of {:?}", args.spender, amount, args.token_address);
    let tx = token::erc20_approve_tx(args.token_address, args.spender, amount);
    let tx_hash = transactions::broadcast(&client, tx).await?;
    Ok(CallToolResult::text(format!("{tx_hash:#x}")))
}

pub fn get_rpc_url<P: JsonRpcClient + Clone>(clients: &ChainClients<P>) -> CallToolResult {
    CallToolResult::text(clients.rpc_url())
}
