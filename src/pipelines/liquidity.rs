//! Liquidity pipeline
//!
//! ApproveBaseAsset -> ApproveQuoteAsset -> SubmitAddLiquidity -> Confirmed.
//! Approval order is USDC (base) then USDT (quote); either approval failure
//! aborts the attempt before any on-chain liquidity write. Minimum-received
//! amounts carry a fixed 0.1% slippage floor.

use crate::chain::{ChainClient, ChainOps, TxReceipt, TxRequest};
use crate::config::EXECUTION_DEADLINE_SECS;
use crate::tokens::addresses;
use crate::Result;
use alloy::primitives::U256;
use alloy::sol;
use alloy::sol_types::SolCall;
use tracing::info;

sol! {
    function addDVMLiquidity(
        address dvmAddress,
        uint256 baseInAmount,
        uint256 quoteInAmount,
        uint256 baseMinAmount,
        uint256 quoteMinAmount,
        uint8 flag,
        uint256 deadLine
    );
}

/// Fixed deposit sizes against the USDC/USDT DVM pool (raw token units)
const BASE_IN_AMOUNT: u64 = 10_000; // USDC
const QUOTE_IN_AMOUNT: u64 = 30_427; // USDT

/// 99.9% of nominal: the fixed slippage floor on minimum-received amounts.
fn min_after_slippage(amount: U256) -> U256 {
    amount * U256::from(999u64) / U256::from(1000u64)
}

/// One liquidity deposit attempt.
pub async fn run<C: ChainClient>(ops: &ChainOps<C>) -> Result<TxReceipt> {
    let base_in = U256::from(BASE_IN_AMOUNT);
    let quote_in = U256::from(QUOTE_IN_AMOUNT);

    info!("checking USDC approval");
    ops.ensure_approval(addresses::USDC, addresses::LIQUIDITY_ROUTER, base_in)
        .await?;
    info!("checking USDT approval");
    ops.ensure_approval(addresses::USDT, addresses::LIQUIDITY_ROUTER, quote_in)
        .await?;

    let deadline = chrono::Utc::now().timestamp() as u64 + EXECUTION_DEADLINE_SECS;
    let call = addDVMLiquidityCall {
        dvmAddress: addresses::DVM_POOL,
        baseInAmount: base_in,
        quoteInAmount: quote_in,
        baseMinAmount: min_after_slippage(base_in),
        quoteMinAmount: min_after_slippage(quote_in),
        flag: 0,
        deadLine: U256::from(deadline),
    };

    let tx = TxRequest::new(addresses::LIQUIDITY_ROUTER, call.abi_encode().into());
    let receipt = ops.submit_and_confirm(tx).await?;
    info!(hash = %receipt.hash, "liquidity added");
    Ok(receipt)
}
