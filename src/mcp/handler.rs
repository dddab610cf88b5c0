//! # MCP Handler Module
//!
//! Protocol front-end: handles incoming MCP requests and forwards tool calls to
//! the dispatcher.
//!
//! ## Supported Tools
//!
//! ### Queries
//! - `get_eth_balance` - Native balance in wei, gwei or ether
//! - `get_erc20_balance` - ERC-20 balance with token decimals applied
//! - `erc20_allowance` - ERC-20 allowance between owner and spender
//! - `call_contract` - Read-only contract call via ABI
//! - `get_rpc_url` - The RPC endpoint in use
//!
//! ### Transactions (require `PRIVATE_KEY`)
//! - `send_eth` - Native value transfer
//! - `erc20_transfer` - ERC-20 transfer
//! - `erc20_approve` - ERC-20 approval
//!
//! Tool failures are reported inside the call result (`isError: true`), never
//! as JSON-RPC errors.

use ethers_providers::JsonRpcClient;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::{
    mcp::{
        dispatch::dispatch,
        protocol::{error_codes, CallToolResult, Request, Response},
        schema::tool_descriptors,
    },
    AppState,
};

pub const SERVER_NAME: &str = "evm_mcp";
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request<P>(req: Request, state: &AppState<P>) -> Option<Response>
where
    P: JsonRpcClient + Clone + 'static,
{
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        debug!("Ignoring notification {}", req.method);
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req, state),
        "ping" => Response::success(req.id, json!({})),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Decodes one stdio frame. Text that is not JSON yields `PARSE_ERROR`; JSON
/// that is not a request yields `INVALID_REQUEST` echoing any `id` it carried.
pub fn parse_frame(line: &str) -> Result<Request, Response> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        error!("JSON parse error: {}", e);
        Response::error(Value::Null, error_codes::PARSE_ERROR, format!("Parse error: {}", e))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        warn!("Invalid request frame: {}", e);
        Response::error(id, error_codes::INVALID_REQUEST, format!("Invalid request: {}", e))
    })
}

/// Runs a tool and folds any failure into an error envelope.
pub async fn call_tool<P>(state: &AppState<P>, name: &str, arguments: &Value) -> CallToolResult
where
    P: JsonRpcClient + Clone + 'static,
{
    match dispatch(state, name, arguments).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Tool {} failed: {}", name, e);
            CallToolResult::error(e)
        }
    }
}

/// Handles a 'tools/call' request.
async fn handle_tool_call<P>(req: Request, state: &AppState<P>) -> Response
where
    P: JsonRpcClient + Clone + 'static,
{
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let args = params.get("arguments").unwrap_or(&Value::Null);
    let result = call_tool(state, tool_name, args).await;

    match serde_json::to_value(&result) {
        Ok(value) => Response::success(req.id.clone(), value),
        Err(e) => Response::error(req.id.clone(), error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

/// Handles the 'initialize' request.
fn handle_initialize<P: JsonRpcClient + Clone>(req: &Request, state: &AppState<P>) -> Response {
    let server_info = json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "chain": state.clients.chain(),
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "EVM MCP server: query native and ERC-20 balances, read contracts, and send transactions from the configured account.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request.
fn handle_tools_list(req: &Request) -> Response {
    Response::success(req.id.clone(), json!({ "tools": tool_descriptors() }))
}
