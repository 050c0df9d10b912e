//! Alloy-backed Pharos chain client
//!
//! One HTTP provider per wallet-cycle, with the wallet attached so nonce,
//! fee and signing concerns stay inside alloy's fillers. The only semantic
//! added here is recognizing the node's internal/overloaded signal
//! (JSON-RPC -32603) so the operations layer can apply its busy retry.

use super::{ChainClient, TxReceipt, TxRequest};
use crate::wallet::Wallet;
use crate::{tokens, Error, Result};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use async_trait::async_trait;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

/// JSON-RPC error code the Pharos node returns while overloaded
const NODE_BUSY_CODE: &str = "-32603";

pub struct PharosClient {
    provider: DynProvider,
}

impl PharosClient {
    /// Connect a wallet-bound provider to the configured RPC endpoint.
    pub fn connect(rpc_url: &str, wallet: &Wallet) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("invalid RPC URL {rpc_url}: {e}")))?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet().clone())
            .connect_http(url)
            .erased();
        Ok(Self { provider })
    }
}

/// Map an RPC-layer failure, surfacing the busy signal distinctly.
fn map_rpc_error(err: impl std::fmt::Display) -> Error {
    let msg = err.to_string();
    if msg.contains(NODE_BUSY_CODE) {
        Error::NodeBusy
    } else {
        Error::Remote(msg)
    }
}

#[async_trait]
impl ChainClient for PharosClient {
    async fn block_number(&self) -> Result<u64> {
        self.provider.get_block_number().await.map_err(map_rpc_error)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        if tokens::registry().is_native(&token) {
            return self.provider.get_balance(owner).await.map_err(map_rpc_error);
        }
        IERC20::new(token, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(map_rpc_error)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(map_rpc_error)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<B256> {
        let pending = IERC20::new(token, &self.provider)
            .approve(spender, amount)
            .send()
            .await
            .map_err(map_rpc_error)?;
        Ok(*pending.tx_hash())
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<B256> {
        let mut request = TransactionRequest::default()
            .with_to(tx.to)
            .with_input(tx.data)
            .with_value(tx.value);
        if let Some(gas_limit) = tx.gas_limit {
            request.set_gas_limit(gas_limit);
        }

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(map_rpc_error)?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(map_rpc_error)?;
        Ok(receipt.map(|r| TxReceipt {
            hash,
            success: r.status(),
        }))
    }
}
