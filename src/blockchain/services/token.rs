// src/blockchain/services/token.rs

use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Address, Bytes, TransactionRequest, U256};
use ethers_core::utils::keccak256;
use ethers_providers::{JsonRpcClient, Middleware, Provider};

use crate::blockchain::models::ToolError;
use crate::utils::MAX_DECIMALS;

fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

fn encode_call(sig: &str, tokens: &[Token]) -> Bytes {
    let mut out = selector(sig).to_vec();
    out.extend(encode(tokens));
    Bytes::from(out)
}

fn decode_u256(sig: &str, bytes: &Bytes) -> Result<U256, ToolError> {
    if bytes.is_empty() {
        return Err(ToolError::ChainRpc(format!(
            "{sig} returned no data (is the address an ERC-20 contract?)"
        )));
    }
    match decode(&[ParamType::Uint(256)], bytes)?.first() {
        Some(Token::Uint(n)) => Ok(*n),
        _ => Err(ToolError::ChainRpc(format!("{sig} returned a non-integer value"))),
    }
}

async fn call_u256<P: JsonRpcClient>(
    provider: &Provider<P>,
    token: Address,
    sig: &str,
    args: &[Token],
) -> Result<U256, ToolError> {
    let tx = TransactionRequest::new().to(token).data(encode_call(sig, args));
    let raw = provider
        .call(&tx.into(), None)
        .await
        .map_err(|e| ToolError::chain(&format!("{sig} call failed"), e))?;
    decode_u256(sig, &raw)
}

pub async fn erc20_balance_of<P: JsonRpcClient>(
    provider: &Provider<P>,
    token: Address,
    owner: Address,
) -> Result<U256, ToolError> {
    call_u256(provider, token, "balanceOf(address)", &[Token::Address(owner)]).await
}

pub async fn erc20_allowance<P: JsonRpcClient>(
    provider: &Provider<P>,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, ToolError> {
    call_u256(
        provider,
        token,
        "allowance(address,address)",
        &[Token::Address(owner), Token::Address(spender)],
    )
    .await
}

pub async fn erc20_decimals<P: JsonRpcClient>(
    provider: &Provider<P>,
    token: Address,
) -> Result<u32, ToolError> {
    let decimals = call_u256(provider, token, "decimals()", &[]).await?;
    if decimals > U256::from(MAX_DECIMALS) {
        return Err(ToolError::ChainRpc(format!(
            "Token reports unsupported decimals value {decimals}"
        )));
    }
    Ok(decimals.as_u32())
}

pub fn erc20_transfer_tx(token: Address, to: Address, amount: U256) -> TransactionRequest {
    let data = encode_call(
        "transfer(address,uint256)",
        &[Token::Address(to), Token::Uint(amount)],
    );
    TransactionRequest::new().to(token).data(data)
}

pub fn erc20_approve_tx(token: Address, spender: Address, amount: U256) -> TransactionRequest {
    let data = encode_call(
        "approve(address,uint256)",
        &[Token::Address(spender), Token::Uint(amount)],
    );
    TransactionRequest::new().to(token).data(data)
}
