// src/mcp/dispatch.rs

use ethers_providers::JsonRpcClient;
use serde_json::Value;
use tracing::{debug, info};

use crate::blockchain::models::ToolError;
use crate::mcp::{
    protocol::CallToolResult,
    schema::{self, ToolArgs, ToolName},
    tools,
};
use crate::AppState;

/// Resolves `tool_name`, validates `raw_args` against its schema and runs the
/// matching handler. The handler's result is returned unchanged.
pub async fn dispatch<P>(state: &AppState<P>, tool_name: &str, raw_args: &Value) -> Result<CallToolResult, ToolError>
where
    P: JsonRpcClient + Clone + 'static,
{
    let tool: ToolName = tool_name.parse()?;
    let args = schema::validate(tool, raw_args)?;
    info!("Dispatching tool {}", tool);
    debug!("Validated arguments: {:?}", args);

    match state.config.rpc_timeout {
        Some(limit) => tokio::time::timeout(limit, invoke(state, args))
            .await
            .map_err(|_| ToolError::ChainRpc(format!("{tool} timed out after {}s", limit.as_secs())))?,
        None => invoke(state, args).await,
    }
}

async fn invoke<P>(state: &AppState<P>, args: ToolArgs) -> Result<CallToolResult, ToolError>
where
    P: JsonRpcClient + Clone + 'static,
{
    let clients = &state.clients;
    let credential = state.config.private_key.as_ref();
    match args {
        ToolArgs::GetEthBalance(a) => tools::get_eth_balance(clients, a).await,
        ToolArgs::GetErc20Balance(a) => tools::get_erc20_balance(clients, a).await,
        ToolArgs::SendEth(a) => tools::send_eth(clients, credential, a).await,
        ToolArgs::CallContract(a) => tools::call_contract(clients, a).await,
        ToolArgs::Erc20Transfer(a) => tools::erc20_transfer(clients, credential, a).await,
        ToolArgs::Erc20Approve(a) => tools::erc20_approve(clients, credential, a).await,
        ToolArgs::Erc20Allowance(a) => tools::erc20_allowance(clients, a).await,
        ToolArgs::GetRpcUrl => Ok(tools::get_rpc_url(clients)),
    }
}
