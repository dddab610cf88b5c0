//! Scripted in-memory EVM node used as the JSON-RPC transport in tests.
//!
//! Answers by method name (and by function selector for `eth_call`), so the
//! order in which concurrent requests arrive does not matter. Every request is
//! recorded for assertions about chain side effects.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::abi::{encode, Token};
use ethers::providers::{JsonRpcClient, JsonRpcError, ProviderError, RpcError};
use ethers::types::{Address, U256};
use ethers::utils::keccak256;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use evm_mcp_adapter::{blockchain::client::ChainClients, config::Config, AppState};

/// Anvil's first default account.
pub const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const TOKEN: &str = "0x1111111111111111111111111111111111111111";
pub const ALICE: &str = "0x2222222222222222222222222222222222222222";
pub const BOB: &str = "0x3333333333333333333333333333333333333333";

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Rpc(JsonRpcError),
}

impl RpcError for NodeError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            NodeError::Rpc(e) => Some(e),
            NodeError::Serde(_) => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            NodeError::Serde(e) => Some(e),
            NodeError::Rpc(_) => None,
        }
    }
}

impl From<NodeError> for ProviderError {
    fn from(err: NodeError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(err))
    }
}

#[derive(Debug, Default)]
struct NodeState {
    chain_id: u64,
    balances: HashMap<Address, U256>,
    calls: HashMap<[u8; 4], Vec<u8>>,
    requests: Vec<String>,
    stalled: HashSet<String>,
    raw_transactions: Vec<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct ScriptedNode {
    state: Arc<Mutex<NodeState>>,
}

pub fn selector(signature: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(signature.as_bytes())[..4]);
    sel
}

fn rpc_error(message: impl Into<String>) -> NodeError {
    NodeError::Rpc(JsonRpcError {
        code: 3,
        message: message.into(),
        data: None,
    })
}

impl ScriptedNode {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(NodeState {
                chain_id: 31337,
                ..NodeState::default()
            })),
        }
    }

    pub fn with_balance(self, address: &str, wei: U256) -> Self {
        let address = Address::from_str(address).expect("address");
        self.state.lock().unwrap().balances.insert(address, wei);
        self
    }

    /// Scripts the ABI-encoded return data of `signature` for any contract.
    pub fn with_call(self, signature: &str, output: &[Token]) -> Self {
        self.state
            .lock()
            .unwrap()
            .calls
            .insert(selector(signature), encode(output));
        self
    }

    pub fn with_erc20(self, balance: u64, decimals: u8) -> Self {
        self.with_call("balanceOf(address)", &[Token::Uint(balance.into())])
            .with_call("decimals()", &[Token::Uint(decimals.into())])
    }

    /// Makes `method` hang forever instead of answering.
    pub fn with_stalled(self, method: &str) -> Self {
        self.state.lock().unwrap().stalled.insert(method.to_string());
        self
    }

    /// Method names received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn raw_transactions(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().raw_transactions.clone()
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(method.to_string());

        match method {
            "eth_chainId" => Ok(json!(U256::from(state.chain_id))),
            "eth_blockNumber" => Ok(json!(U256::one())),
            "eth_getBalance" => {
                let address = params[0]
                    .as_str()
                    .and_then(|s| Address::from_str(s).ok())
                    .ok_or_else(|| rpc_error("bad address"))?;
                let balance = state.balances.get(&address).copied().unwrap_or_default();
                Ok(json!(balance))
            }
            "eth_call" => {
                let tx = &params[0];
                let data = tx
                    .get("data")
                    .or_else(|| tx.get("input"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| rpc_error("missing calldata"))?;
                let bytes = hex::decode(data.trim_start_matches("0x")).map_err(|e| rpc_error(e.to_string()))?;
                if bytes.len() < 4 {
                    return Err(rpc_error("execution reverted"));
                }
                let mut sel = [0u8; 4];
                sel.copy_from_slice(&bytes[..4]);
                let output = state
                    .calls
                    .get(&sel)
                    .ok_or_else(|| rpc_error("execution reverted"))?;
                Ok(json!(format!("0x{}", hex::encode(output))))
            }
            "eth_getTransactionCount" => Ok(json!(U256::zero())),
            "eth_gasPrice" => Ok(json!(U256::from(1_000_000_000u64))),
            "eth_estimateGas" => Ok(json!(U256::from(60_000u64))),
            "eth_sendRawTransaction" => {
                let raw = params[0].as_str().ok_or_else(|| rpc_error("missing raw tx"))?;
                let bytes = hex::decode(raw.trim_start_matches("0x")).map_err(|e| rpc_error(e.to_string()))?;
                let hash = keccak256(&bytes);
                state.raw_transactions.push(bytes);
                Ok(json!(format!("0x{}", hex::encode(hash))))
            }
            other => Err(rpc_error(format!("method {other} not scripted"))),
        }
    }
}

#[async_trait]
impl JsonRpcClient for ScriptedNode {
    type Error = NodeError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, NodeError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let stalled = {
            let mut state = self.state.lock().unwrap();
            let stalled = state.stalled.contains(method);
            if stalled {
                state.requests.push(method.to_string());
            }
            stalled
        };
        if stalled {
            std::future::pending::<()>().await;
        }

        let params = serde_json::to_value(params)?;
        let result = self.answer(method, &params)?;
        Ok(serde_json::from_value(result)?)
    }
}

/// Builds application state over `node` from the given environment entries.
pub fn test_state(node: &ScriptedNode, env: &[(&str, &str)]) -> AppState<ScriptedNode> {
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_sources(Vec::new(), |key| env.get(key).cloned()).expect("config");
    let clients = ChainClients::with_transport(node.clone(), config.chain.clone());
    AppState::new(config, clients)
}

pub fn signing_state(node: &ScriptedNode) -> AppState<ScriptedNode> {
    test_state(node, &[("PRIVATE_KEY", TEST_PRIVATE_KEY)])
}
