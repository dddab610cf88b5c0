//! Tool name resolution and argument validation.

mod common;

use common::*;
use evm_mcp_adapter::blockchain::models::ToolError;
use evm_mcp_adapter::mcp::dispatch::dispatch;
use evm_mcp_adapter::mcp::handler::call_tool;
use evm_mcp_adapter::mcp::schema::{tool_descriptors, validate, ToolArgs, ToolName, Unit};
use serde_json::json;

#[tokio::test]
async fn test_unknown_tool_is_rejected() {
    let node = ScriptedNode::new();
    let state = test_state(&node, &[]);

    let err = dispatch(&state, "get_balance", &json!({})).await.unwrap_err();

    assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "get_balance"));
    assert_eq!(err.to_string(), "Unknown tool: get_balance");
    assert!(node.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_address_fails_validation_without_rpc() {
    let node = ScriptedNode::new();
    let state = test_state(&node, &[]);

    let bad_addresses = [
        "0x1234",
        "1111111111111111111111111111111111111111",
        "0xZZ11111111111111111111111111111111111111",
        "0X2222222222222222222222222222222222222222",
    ];
    for bad in bad_addresses {
        let err = dispatch(&state, "get_eth_balance", &json!({"address": bad})).await.unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)), "accepted {bad}");
    }
    assert!(node.requests().is_empty());
}

#[tokio::test]
async fn test_rpc_deadline_turns_hung_call_into_error() {
    let node = ScriptedNode::new().with_stalled("eth_getBalance");
    let state = test_state(&node, &[("RPC_TIMEOUT_SECS", "1")]);

    let err = dispatch(&state, "get_eth_balance", &json!({"address": ALICE})).await.unwrap_err();
    assert!(matches!(err, ToolError::ChainRpc(_)));
    assert_eq!(err.to_string(), "get_eth_balance timed out after 1s");
    assert_eq!(node.requests(), vec!["eth_getBalance"]);

    let result = call_tool(&state, "get_eth_balance", &json!({"address": ALICE})).await;
    assert!(result.is_error);
    assert!(result.first_text().unwrap().contains("timed out"));
}

#[test]
fn test_validation_reports_every_violation() {
    let err = validate(
        ToolName::Erc20Transfer,
        &json!({"tokenAddress": 42, "amount": "1.2.3"}),
    )
    .unwrap_err();

    let ToolError::Validation(violations) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["tokenAddress", "to", "amount"]);

    let message = err.to_string();
    assert!(message.contains("tokenAddress: Expected string, received number"));
    assert!(message.contains("to: Required"));
    assert!(message.contains("amount: Invalid decimal amount"));
}

#[test]
fn test_unit_enum_mismatch() {
    let err = validate(ToolName::GetEthBalance, &json!({"address": ALICE, "unit": "btc"})).unwrap_err();
    assert!(err.to_string().contains("unit: Invalid enum value"));
    assert!(err.to_string().contains("received 'btc'"));
}

#[test]
fn test_defaults_are_applied() {
    let args = validate(ToolName::GetEthBalance, &json!({"address": ALICE})).unwrap();
    match args {
        ToolArgs::GetEthBalance(a) => assert_eq!(a.unit, Unit::Ether),
        other => panic!("unexpected {other:?}"),
    }

    let args = validate(
        ToolName::CallContract,
        &json!({"address": TOKEN, "abi": "[]", "functionName": "x"}),
    )
    .unwrap();
    match args {
        ToolArgs::CallContract(a) => {
            assert!(a.args.is_empty());
            assert_eq!(a.abi, json!([]));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_abi_must_be_json() {
    let err = validate(
        ToolName::CallContract,
        &json!({"address": TOKEN, "abi": "not json", "functionName": "x", "args": "nope"}),
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("abi: Invalid JSON"));
    assert!(message.contains("args: Expected array, received string"));
}

#[test]
fn test_arguments_must_be_an_object() {
    let err = validate(ToolName::GetRpcUrl, &json!([1, 2])).unwrap_err();
    assert!(err.to_string().contains("arguments: Expected object, received array"));
    assert!(validate(ToolName::GetRpcUrl, &serde_json::Value::Null).is_ok());
}

#[test]
fn test_registry_lists_every_tool_once() {
    let names: Vec<&str> = tool_descriptors().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "get_eth_balance",
            "get_erc20_balance",
            "send_eth",
            "call_contract",
            "erc20_transfer",
            "erc20_approve",
            "erc20_allowance",
            "get_rpc_url",
        ]
    );
    for tool in ToolName::ALL {
        assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
    }

    let send = &tool_descriptors()[2];
    assert_eq!(send.input_schema["required"], json!(["to", "amountEth"]));
}
