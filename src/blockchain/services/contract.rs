// src/blockchain/services/contract.rs

use std::str::FromStr;

use ethers_core::abi::{Abi, Function, ParamType, Token};
use ethers_core::types::{Address, TransactionRequest, I256, U256};
use ethers_core::utils::to_checksum;
use ethers_providers::{JsonRpcClient, Middleware, Provider};
use serde_json::Value;

use crate::blockchain::models::ToolError;

/// Integers at least this wide are rendered as decimal strings.
const WIDE_INT_BITS: usize = 64;

/// Parses a JSON ABI (already decoded from text when it arrived as a string).
pub fn parse_abi(abi: &Value) -> Result<Abi, ToolError> {
    serde_json::from_value(abi.clone()).map_err(|e| ToolError::chain("Invalid ABI", e))
}

/// Picks `function_name` from the ABI, preferring the overload whose arity matches.
fn find_function<'a>(abi: &'a Abi, function_name: &str, arity: usize) -> Result<&'a Function, ToolError> {
    let overloads = abi.functions_by_name(function_name).map_err(|_| {
        ToolError::ChainRpc(format!("Function \"{function_name}\" not found on ABI"))
    })?;
    overloads
        .iter()
        .find(|f| f.inputs.len() == arity)
        .or_else(|| overloads.first())
        .ok_or_else(|| ToolError::ChainRpc(format!("Function \"{function_name}\" not found on ABI")))
}

/// Read-only invocation (`eth_call`) of `function_name` with JSON arguments.
/// Returns the decoded outputs as JSON: a single output unwrapped, several as an array.
pub async fn read_contract<P: JsonRpcClient>(
    provider: &Provider<P>,
    address: Address,
    abi: &Abi,
    function_name: &str,
    args: &[Value],
) -> Result<Value, ToolError> {
    let func = find_function(abi, function_name, args.len())?;
    let tokens = coerce_tokens(func, args)?;
    let data = func.encode_input(&tokens)?;

    let tx = TransactionRequest::new().to(address).data(data);
    let output = provider
        .call(&tx.into(), None)
        .await
        .map_err(|e| ToolError::chain(&format!("Call to {function_name} failed"), e))?;
    let decoded = func.decode_output(&output)?;

    let mut values: Vec<Value> = func
        .outputs
        .iter()
        .zip(decoded.iter())
        .map(|(param, token)| render_token(Some(&param.kind), token))
        .collect();
    Ok(match values.len() {
        0 => Value::Null,
        1 => values.remove(0),
        _ => Value::Array(values),
    })
}

fn coerce_tokens(func: &Function, args: &[Value]) -> Result<Vec<Token>, ToolError> {
    if func.inputs.len() != args.len() {
        return Err(ToolError::ChainRpc(format!(
            "{} expects {} argument(s), got {}",
            func.name,
            func.inputs.len(),
            args.len()
        )));
    }
    func.inputs
        .iter()
        .zip(args)
        .map(|(param, value)| {
            coerce_token(&param.kind, value).map_err(|e| {
                ToolError::ChainRpc(format!("Argument \"{}\" of {}: {}", param.name, func.name, e))
            })
        })
        .collect()
}

fn coerce_token(kind: &ParamType, val: &Value) -> Result<Token, String> {
    let as_str = |what: &str| val.as_str().ok_or_else(|| format!("{what} arg must be a string"));
    let tok = match kind {
        ParamType::Address => Token::Address(
            Address::from_str(as_str("address")?).map_err(|e| format!("invalid address: {e}"))?,
        ),
        ParamType::Uint(_) => Token::Uint(parse_uint(val)?),
        ParamType::Int(_) => Token::Int(parse_int(val)?.into_raw()),
        ParamType::Bool => match val {
            Value::Bool(b) => Token::Bool(*b),
            Value::String(s) if s == "true" || s == "false" => Token::Bool(s == "true"),
            _ => return Err("bool arg must be boolean".to_string()),
        },
        ParamType::String => Token::String(as_str("string")?.to_string()),
        ParamType::Bytes => Token::Bytes(decode_hex(as_str("bytes")?)?),
        ParamType::FixedBytes(n) => {
            let bytes = decode_hex(as_str("bytes")?)?;
            if bytes.len() != *n {
                return Err(format!("expected {} bytes, got {}", n, bytes.len()));
            }
            Token::FixedBytes(bytes)
        }
        ParamType::Array(inner) => Token::Array(coerce_list(inner, val)?),
        ParamType::FixedArray(inner, n) => {
            let items = coerce_list(inner, val)?;
            if items.len() != *n {
                return Err(format!("expected {} items, got {}", n, items.len()));
            }
            Token::FixedArray(items)
        }
        ParamType::Tuple(components) => {
            let items = val.as_array().ok_or("tuple arg must be an array")?;
            if items.len() != components.len() {
                return Err(format!("expected {} tuple fields, got {}", components.len(), items.len()));
            }
            Token::Tuple(
                components
                    .iter()
                    .zip(items)
                    .map(|(kind, item)| coerce_token(kind, item))
                    .collect::<Result<_, _>>()?,
            )
        }
    };
    Ok(tok)
}

fn coerce_list(inner: &ParamType, val: &Value) -> Result<Vec<Token>, String> {
    val.as_array()
        .ok_or("array arg must be a JSON array")?
        .iter()
        .map(|item| coerce_token(inner, item))
        .collect()
}

fn parse_uint(val: &Value) -> Result<U256, String> {
    match val {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("{n} is not an unsigned integer; pass large values as strings")),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| e.to_string()),
            None => U256::from_dec_str(s).map_err(|e| format!("invalid uint {s:?}: {e}")),
        },
        _ => Err("uint arg must be a number or decimal string".to_string()),
    }
}

fn parse_int(val: &Value) -> Result<I256, String> {
    match val {
        Value::Number(n) => n
            .as_i64()
            .map(I256::from)
            .ok_or_else(|| format!("{n} is not an integer; pass large values as strings")),
        Value::String(s) => I256::from_dec_str(s).map_err(|e| format!("invalid int {s:?}: {e}")),
        _ => Err("int arg must be a number or decimal string".to_string()),
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| format!("invalid hex: {e}"))
}

/// Renders a decoded token as JSON. Integers of 64 bits or more become decimal
/// strings so no precision is lost in JSON clients.
fn render_token(kind: Option<&ParamType>, token: &Token) -> Value {
    match token {
        Token::Uint(n) => match kind {
            Some(ParamType::Uint(bits)) if *bits < WIDE_INT_BITS => Value::from(n.low_u64()),
            _ => Value::String(n.to_string()),
        },
        Token::Int(raw) => {
            let n = I256::from_raw(*raw);
            match kind {
                Some(ParamType::Int(bits)) if *bits < WIDE_INT_BITS => n
                    .to_string()
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(n.to_string())),
                _ => Value::String(n.to_string()),
            }
        }
        Token::Address(a) => Value::String(to_checksum(a, None)),
        Token::Bool(b) => Value::Bool(*b),
        Token::String(s) => Value::String(s.clone()),
        Token::Bytes(b) | Token::FixedBytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        Token::Array(items) | Token::FixedArray(items) => {
            let inner = match kind {
                Some(ParamType::Array(inner)) | Some(ParamType::FixedArray(inner, _)) => Some(&**inner),
                _ => None,
            };
            Value::Array(items.iter().map(|t| render_token(inner, t)).collect())
        }
        Token::Tuple(items) => {
            let kinds = match kind {
                Some(ParamType::Tuple(kinds)) => Some(kinds),
                _ => None,
            };
            Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, t)| render_token(kinds.and_then(|k| k.get(i)), t))
                    .collect(),
            )
        }
    }
}
