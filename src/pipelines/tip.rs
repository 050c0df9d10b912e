//! Primus tip pipeline
//!
//! Sends a small randomized amount of native PHRS to an X handle through the
//! Primus tipping contract. The tip amount is drawn uniformly per attempt
//! and the transaction value always equals the encoded amount.

use crate::chain::{ChainClient, ChainOps, TxReceipt, TxRequest};
use crate::tokens::addresses;
use crate::Result;
use alloy::primitives::U256;
use alloy::sol;
use alloy::sol_types::SolCall;
use rand::Rng;
use tracing::info;

sol! {
    struct TipToken {
        uint32 tokenType;
        address tokenAddress;
    }

    struct TipRecipient {
        string idSource;
        string id;
        uint256 amount;
        uint256[] nftIds;
    }

    function tip(TipToken calldata token, TipRecipient calldata recipient);
}

/// Inclusive tip bounds in wei: 0.0000001 to 0.00000015 PHRS.
const MIN_TIP_WEI: u64 = 100_000_000_000;
const MAX_TIP_WEI: u64 = 150_000_000_000;

/// Recipients are identified by X (Twitter) handle
const ID_SOURCE: &str = "x";

/// Native-token tip, no NFTs attached
const NATIVE_TOKEN_TYPE: u32 = 1;

fn random_tip_amount() -> U256 {
    U256::from(rand::rng().random_range(MIN_TIP_WEI..=MAX_TIP_WEI))
}

/// One tip attempt against the Primus contract.
pub async fn run<C: ChainClient>(ops: &ChainOps<C>, username: &str) -> Result<TxReceipt> {
    let amount = random_tip_amount();
    info!(recipient = username, amount = %amount, "sending tip");
    let receipt = send_tip(ops, username, amount).await?;
    info!(hash = %receipt.hash, "tip confirmed");
    Ok(receipt)
}

async fn send_tip<C: ChainClient>(
    ops: &ChainOps<C>,
    username: &str,
    amount: U256,
) -> Result<TxReceipt> {
    let call = tipCall {
        token: TipToken {
            tokenType: NATIVE_TOKEN_TYPE,
            tokenAddress: addresses::ZERO_ADDRESS,
        },
        recipient: TipRecipient {
            idSource: ID_SOURCE.to_string(),
            id: username.to_string(),
            amount,
            nftIds: Vec::new(),
        },
    };

    let tx = TxRequest::new(addresses::PRIMUS_TIP, call.abi_encode().into()).with_value(amount);
    ops.submit_and_confirm(tx).await
}
