//! # Tool schema registry
//!
//! Declares every tool this server exposes: its name, description, the JSON
//! Schema advertised to clients, and the validation that turns untyped call
//! arguments into a typed record. Validation reports every violated constraint,
//! not only the first one, and never touches the chain.

use std::fmt;
use std::str::FromStr;

use ethers_core::types::Address;
use lazy_static::lazy_static;
use serde_json::{json, Map, Value};

use crate::blockchain::models::{ToolError, Violation};
use crate::mcp::protocol::ToolDescriptor;
use crate::utils::is_decimal_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetEthBalance,
    GetErc20Balance,
    SendEth,
    CallContract,
    Erc20Transfer,
    Erc20Approve,
    Erc20Allowance,
    GetRpcUrl,
}

impl ToolName {
    pub const ALL: [ToolName; 8] = [
        ToolName::GetEthBalance,
        ToolName::GetErc20Balance,
        ToolName::SendEth,
        ToolName::CallContract,
        ToolName::Erc20Transfer,
        ToolName::Erc20Approve,
        ToolName::Erc20Allowance,
        ToolName::GetRpcUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetEthBalance => "get_eth_balance",
            ToolName::GetErc20Balance => "get_erc20_balance",
            ToolName::SendEth => "send_eth",
            ToolName::CallContract => "call_contract",
            ToolName::Erc20Transfer => "erc20_transfer",
            ToolName::Erc20Approve => "erc20_approve",
            ToolName::Erc20Allowance => "erc20_allowance",
            ToolName::GetRpcUrl => "get_rpc_url",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ToolName::GetEthBalance => "Get the native ETH balance of an address.",
            ToolName::GetErc20Balance => "Get the ERC-20 token balance of an account.",
            ToolName::SendEth => "Send ETH from the server's configured account (requires PRIVATE_KEY).",
            ToolName::CallContract => "Call a read-only contract function using its ABI.",
            ToolName::Erc20Transfer => "Transfer ERC-20 tokens from the server's configured account (requires PRIVATE_KEY).",
            ToolName::Erc20Approve => "Approve a spender for ERC-20 tokens; amount \"0\" revokes (requires PRIVATE_KEY).",
            ToolName::Erc20Allowance => "Get the ERC-20 allowance an owner granted to a spender.",
            ToolName::GetRpcUrl => "Get the RPC endpoint this server is connected to.",
        }
    }

    fn input_schema(self) -> Value {
        let address = |desc: &str| json!({"type": "string", "pattern": "^0x[0-9a-fA-F]{40}$", "description": desc});
        let amount = |desc: &str| json!({"type": "string", "pattern": "^[0-9]*\\.?[0-9]*$", "description": desc});
        let (properties, required) = match self {
            ToolName::GetEthBalance => (
                json!({
                    "address": address("Address to query."),
                    "unit": {"type": "string", "enum": Unit::NAMES, "default": "ether", "description": "Unit for the returned balance."}
                }),
                json!(["address"]),
            ),
            ToolName::GetErc20Balance => (
                json!({
                    "tokenAddress": address("ERC-20 contract address."),
                    "accountAddress": address("Account whose balance to read.")
                }),
                json!(["tokenAddress", "accountAddress"]),
            ),
            ToolName::SendEth => (
                json!({
                    "to": address("Recipient address."),
                    "amountEth": amount("Amount of ETH as a decimal string, e.g. \"0.1\".")
                }),
                json!(["to", "amountEth"]),
            ),
            ToolName::CallContract => (
                json!({
                    "address": address("Contract address."),
                    "abi": {"type": ["string", "array"], "description": "Contract ABI as JSON text or a JSON array."},
                    "functionName": {"type": "string", "description": "Function to call."},
                    "args": {"type": "array", "default": [], "description": "Function arguments."}
                }),
                json!(["address", "abi", "functionName"]),
            ),
            ToolName::Erc20Transfer => (
                json!({
                    "tokenAddress": address("ERC-20 contract address."),
                    "to": address("Recipient address."),
                    "amount": amount("Token amount in whole units, e.g. \"1.5\".")
                }),
                json!(["tokenAddress", "to", "amount"]),
            ),
            ToolName::Erc20Approve => (
                json!({
                    "tokenAddress": address("ERC-20 contract address."),
                    "spender": address("Spender address."),
                    "amount": amount("Allowance in whole units; \"0\" revokes.")
                }),
                json!(["tokenAddress", "spender", "amount"]),
            ),
            ToolName::Erc20Allowance => (
                json!({
                    "tokenAddress": address("ERC-20 contract address."),
                    "owner": address("Token owner."),
                    "spender": address("Approved spender.")
                }),
                json!(["tokenAddress", "owner", "spender"]),
            ),
            ToolName::GetRpcUrl => (json!({}), json!([])),
        };
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    fn descriptor(self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }
}

lazy_static! {
    static ref TOOL_DESCRIPTORS: Vec<ToolDescriptor> =
        ToolName::ALL.iter().map(|tool| tool.descriptor()).collect();
}

/// Every advertised tool, in a fixed order.
pub fn tool_descriptors() -> &'static [ToolDescriptor] {
    &TOOL_DESCRIPTORS
}

// --- Typed argument records ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Wei,
    Gwei,
    Ether,
}

impl Unit {
    const NAMES: [&'static str; 3] = ["wei", "ether", "gwei"];

    /// Fractional digits of this unit relative to wei.
    pub fn decimals(self) -> u32 {
        match self {
            Unit::Wei => 0,
            Unit::Gwei => 9,
            Unit::Ether => 18,
        }
    }
}

impl FromStr for Unit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wei" => Ok(Unit::Wei),
            "gwei" => Ok(Unit::Gwei),
            "ether" => Ok(Unit::Ether),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthBalanceArgs {
    pub address: Address,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20BalanceArgs {
    pub token_address: Address,
    pub account_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEthArgs {
    pub to: Address,
    pub amount_eth: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallContractArgs {
    pub address: Address,
    /// Structured ABI; JSON text has already been parsed.
    pub abi: Value,
    pub function_name: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20TransferArgs {
    pub token_address: Address,
    pub to: Address,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20ApproveArgs {
    pub token_address: Address,
    pub spender: Address,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20AllowanceArgs {
    pub token_address: Address,
    pub owner: Address,
    pub spender: Address,
}

/// Validated arguments, one variant per tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    GetEthBalance(EthBalanceArgs),
    GetErc20Balance(Erc20BalanceArgs),
    SendEth(SendEthArgs),
    CallContract(CallContractArgs),
    Erc20Transfer(Erc20TransferArgs),
    Erc20Approve(Erc20ApproveArgs),
    Erc20Allowance(Erc20AllowanceArgs),
    GetRpcUrl,
}

// --- Validation ---

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_address(s: &str) -> Option<Address> {
    let hex_part = s.strip_prefix("0x")?;
    if hex_part.len() != 40 {
        return None;
    }
    hex::decode(hex_part).ok().map(|bytes| Address::from_slice(&bytes))
}

/// Reads fields out of the argument object, collecting every violation.
struct ArgReader<'a> {
    args: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl<'a> ArgReader<'a> {
    fn new(args: &'a Map<String, Value>) -> Self {
        Self {
            args,
            violations: Vec::new(),
        }
    }

    fn violate(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    fn string(&mut self, field: &str) -> Option<&'a str> {
        match self.args.get(field) {
            None | Some(Value::Null) => {
                self.violate(field, "Required");
                None
            }
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                self.violate(field, format!("Expected string, received {}", kind_of(other)));
                None
            }
        }
    }

    fn optional_string(&mut self, field: &str) -> Option<Option<&'a str>> {
        match self.args.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(_) => self.string(field).map(Some),
        }
    }

    fn address(&mut self, field: &str) -> Option<Address> {
        let raw = self.string(field)?;
        let parsed = parse_address(raw);
        if parsed.is_none() {
            self.violate(field, format!("Invalid address {raw:?}; expected 0x followed by 40 hex digits"));
        }
        parsed
    }

    fn amount(&mut self, field: &str) -> Option<String> {
        let raw = self.string(field)?.trim();
        if is_decimal_amount(raw) {
            Some(raw.to_string())
        } else {
            self.violate(field, format!("Invalid decimal amount {raw:?}"));
            None
        }
    }

    fn unit(&mut self, field: &str) -> Option<Unit> {
        let raw = self.optional_string(field)?.unwrap_or("ether");
        let unit = raw.parse::<Unit>().ok();
        if unit.is_none() {
            let expected = Unit::NAMES.map(|n| format!("'{n}'")).join(" | ");
            self.violate(
                field,
                format!("Invalid enum value. Expected {expected}, received '{raw}'"),
            );
        }
        unit
    }

    fn abi(&mut self, field: &str) -> Option<Value> {
        match self.args.get(field) {
            None | Some(Value::Null) => {
                self.violate(field, "Required");
                None
            }
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(parsed @ Value::Array(_)) => Some(parsed),
                Ok(other) => {
                    self.violate(field, format!("Expected a JSON array, received {}", kind_of(&other)));
                    None
                }
                Err(e) => {
                    self.violate(field, format!("Invalid JSON: {e}"));
                    None
                }
            },
            Some(structured @ Value::Array(_)) => Some(structured.clone()),
            Some(other) => {
                self.violate(field, format!("Expected string or array, received {}", kind_of(other)));
                None
            }
        }
    }

    fn array(&mut self, field: &str) -> Option<Vec<Value>> {
        match self.args.get(field) {
            None | Some(Value::Null) => Some(Vec::new()),
            Some(Value::Array(items)) => Some(items.clone()),
            Some(other) => {
                self.violate(field, format!("Expected array, received {}", kind_of(other)));
                None
            }
        }
    }

    /// Builds the record when no violation was recorded.
    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ToolError> {
        if !self.violations.is_empty() {
            return Err(ToolError::Validation(self.violations));
        }
        build().ok_or_else(|| ToolError::Validation(Vec::new()))
    }
}

/// Validates raw call arguments for `tool`.
pub fn validate(tool: ToolName, raw_args: &Value) -> Result<ToolArgs, ToolError> {
    let empty = Map::new();
    let args = match raw_args {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ToolError::invalid(
                "arguments",
                format!("Expected object, received {}", kind_of(other)),
            ))
        }
    };
    let mut r = ArgReader::new(args);

    match tool {
        ToolName::GetEthBalance => {
            let address = r.address("address");
            let unit = r.unit("unit");
            r.finish(|| Some(ToolArgs::GetEthBalance(EthBalanceArgs { address: address?, unit: unit? })))
        }
        ToolName::GetErc20Balance => {
            let token_address = r.address("tokenAddress");
            let account_address = r.address("accountAddress");
            r.finish(|| {
                Some(ToolArgs::GetErc20Balance(Erc20BalanceArgs {
                    token_address: token_address?,
                    account_address: account_address?,
                }))
            })
        }
        ToolName::SendEth => {
            let to = r.address("to");
            let amount_eth = r.amount("amountEth");
            r.finish(|| Some(ToolArgs::SendEth(SendEthArgs { to: to?, amount_eth: amount_eth? })))
        }
        ToolName::CallContract => {
            let address = r.address("address");
            let abi = r.abi("abi");
            let function_name = r.string("functionName");
            let call_args = r.array("args");
            r.finish(|| {
                Some(ToolArgs::CallContract(CallContractArgs {
                    address: address?,
                    abi: abi?,
                    function_name: function_name?.to_string(),
                    args: call_args?,
                }))
            })
        }
        ToolName::Erc20Transfer => {
            let token_address = r.address("tokenAddress");
            let to = r.address("to");
            let amount = r.amount("amount");
            r.finish(|| {
                Some(ToolArgs::Erc20Transfer(Erc20TransferArgs {
                    token_address: token_address?,
                    to: to?,
                    amount: amount?,
                }))
            })
        }
        ToolName::Erc20Approve => {
            let token_address = r.address("tokenAddress");
            let spender = r.address("spender");
            let amount = r.amount("amount");
            r.finish(|| {
                Some(ToolArgs::Erc20Approve(Erc20ApproveArgs {
                    token_address: token_address?,
                    spender: spender?,
                    amount: amount?,
                }))
            })
        }
        ToolName::Erc20Allowance => {
            let token_address = r.address("tokenAddress");
            let owner = r.address("owner");
            let spender = r.address("spender");
            r.finish(|| {
                Some(ToolArgs::Erc20Allowance(Erc20AllowanceArgs {
                    token_address: token_address?,
                    owner: owner?,
                    spender: spender?,
                }))
            })
        }
        ToolName::GetRpcUrl => r.finish(|| Some(ToolArgs::GetRpcUrl)),
    }
}
