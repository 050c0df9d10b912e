//! Chain operation layer
//!
//! [`ChainClient`] is the seam to the external chain capability: balance and
//! allowance reads, approvals, raw transaction submission and receipt
//! lookups. Signing and RPC transport live behind it (see
//! [`client::PharosClient`]); everything above works against the trait.
//!
//! [`ChainOps`] adds the orchestration-relevant semantics: the node-busy
//! retry policy, idempotent approval, and submit-then-confirm with a bounded
//! polling budget.

pub mod client;

use crate::config::{
    CONFIRM_BUDGET, CONFIRM_POLL_INTERVAL, NODE_BUSY_ATTEMPTS, NODE_BUSY_DELAY,
};
use crate::retry::{retry, RetryPolicy};
use crate::{tokens, Error, Result};
use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

pub use client::PharosClient;

/// A write operation ready for submission
#[derive(Debug, Clone)]
pub struct TxRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    /// Explicit gas ceiling; `None` lets the node estimate
    pub gas_limit: Option<u64>,
}

impl TxRequest {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
            gas_limit: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Result of a mined transaction; never mutated after creation
#[derive(Debug, Clone, Copy)]
pub struct TxReceipt {
    pub hash: B256,
    pub success: bool,
}

/// External chain-client capability.
///
/// Implementations must surface the node-overloaded signal as
/// [`Error::NodeBusy`] so the busy-retry policy can trigger; every other
/// failure propagates unchanged.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn block_number(&self) -> Result<u64>;

    /// Token balance; the native sentinel address reads the account balance.
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Submit an ERC-20 approval, returning the transaction hash.
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<B256>;

    /// Submit an arbitrary write, returning the transaction hash.
    async fn send_transaction(&self, tx: TxRequest) -> Result<B256>;

    /// One receipt poll; `None` while the transaction is pending.
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>>;
}

// A shared client drives multiple wallet sessions.
#[async_trait]
impl<C: ChainClient + ?Sized> ChainClient for std::sync::Arc<C> {
    async fn block_number(&self) -> Result<u64> {
        (**self).block_number().await
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        (**self).balance_of(token, owner).await
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        (**self).allowance(token, owner, spender).await
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<B256> {
        (**self).approve(token, spender, amount).await
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<B256> {
        (**self).send_transaction(tx).await
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>> {
        (**self).transaction_receipt(hash).await
    }
}

/// Chain operations for one wallet, bound to its owning address
pub struct ChainOps<C> {
    client: C,
    owner: Address,
    busy_policy: RetryPolicy,
    confirm_budget: Duration,
    confirm_interval: Duration,
}

impl<C: ChainClient> ChainOps<C> {
    pub fn new(client: C, owner: Address) -> Self {
        Self {
            client,
            owner,
            busy_policy: RetryPolicy::new(NODE_BUSY_ATTEMPTS, NODE_BUSY_DELAY),
            confirm_budget: CONFIRM_BUDGET,
            confirm_interval: CONFIRM_POLL_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_timing(
        mut self,
        busy_policy: RetryPolicy,
        confirm_budget: Duration,
        confirm_interval: Duration,
    ) -> Self {
        self.busy_policy = busy_policy;
        self.confirm_budget = confirm_budget;
        self.confirm_interval = confirm_interval;
        self
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Apply the node-busy policy: bounded retry on the busy signal only,
    /// `NodeUnavailable` once the budget is spent.
    async fn busy_retry<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        retry(self.busy_policy, Error::is_node_busy, op)
            .await
            .map_err(|e| {
                if e.is_node_busy() {
                    Error::NodeUnavailable
                } else {
                    e
                }
            })
    }

    /// Start-up probe confirming the node answers at all.
    pub async fn check_connection(&self) -> Result<u64> {
        self.busy_retry(|| self.client.block_number()).await
    }

    pub async fn read_balance(&self, token: Address) -> Result<U256> {
        self.busy_retry(|| self.client.balance_of(token, self.owner))
            .await
    }

    pub async fn read_allowance(&self, token: Address, spender: Address) -> Result<U256> {
        self.busy_retry(|| self.client.allowance(token, self.owner, spender))
            .await
    }

    /// Make sure `spender` may move `required` of `token`.
    ///
    /// Native tokens need no approval. Fails with `InsufficientBalance` when
    /// the wallet cannot cover `required`. When the existing allowance
    /// already covers it this is a no-op, which makes repeated calls safe
    /// and cheap; otherwise a maximal-sentinel approval is submitted and
    /// confirmed.
    pub async fn ensure_approval(
        &self,
        token: Address,
        spender: Address,
        required: U256,
    ) -> Result<()> {
        let registry = tokens::registry();
        if registry.is_native(&token) {
            return Ok(());
        }
        let symbol = registry.symbol(&token);

        let balance = self.read_balance(token).await?;
        if balance < required {
            return Err(Error::InsufficientBalance {
                symbol,
                required: required.to_string(),
                available: balance.to_string(),
            });
        }

        let allowance = self.read_allowance(token, spender).await?;
        if allowance >= required {
            debug!(token = %symbol, %spender, "allowance already sufficient");
            return Ok(());
        }

        info!(token = %symbol, %spender, "submitting approval");
        let hash = self
            .busy_retry(|| self.client.approve(token, spender, U256::MAX))
            .await?;
        let receipt = self.wait_confirmed(hash).await?;
        if !receipt.success {
            return Err(Error::Reverted(hash));
        }
        info!(token = %symbol, hash = %hash, "approval confirmed");
        Ok(())
    }

    /// Submit a write and block until the node reports it mined.
    pub async fn submit_and_confirm(&self, tx: TxRequest) -> Result<TxReceipt> {
        let hash = self
            .busy_retry(|| self.client.send_transaction(tx.clone()))
            .await?;
        info!(hash = %hash, to = %tx.to, "transaction sent");
        let receipt = self.wait_confirmed(hash).await?;
        if !receipt.success {
            return Err(Error::Reverted(hash));
        }
        info!(hash = %hash, "transaction confirmed");
        Ok(receipt)
    }

    /// Poll receipts until mined or the confirmation budget runs out.
    async fn wait_confirmed(&self, hash: B256) -> Result<TxReceipt> {
        let deadline = Instant::now() + self.confirm_budget;
        loop {
            if let Some(receipt) = self
                .busy_retry(|| self.client.transaction_receipt(hash))
                .await?
            {
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!(
                    "transaction {hash} unconfirmed after {:?}",
                    self.confirm_budget
                )));
            }
            tokio::time::sleep(self.confirm_interval).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory chain used by the pipeline tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// One recorded capability invocation
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Balance(Address),
        Allowance(Address, Address),
        Approve(Address, Address),
        Send(Address),
        Receipt(B256),
    }

    #[derive(Default)]
    pub struct MockChain {
        pub calls: Mutex<Vec<Call>>,
        pub balances: Mutex<HashMap<Address, U256>>,
        pub allowances: Mutex<HashMap<(Address, Address), U256>>,
        /// Remaining reads that answer with the busy signal
        pub busy_reads: AtomicU32,
        /// All receipts report on-chain failure
        pub revert_receipts: AtomicBool,
        /// Balance overrides applied once the next send confirms
        pub balances_after_confirm: Mutex<HashMap<Address, U256>>,
        next_hash: AtomicU64,
    }

    impl MockChain {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_balance(&self, token: Address, amount: U256) {
            self.balances.lock().unwrap().insert(token, amount);
        }

        pub fn set_allowance(&self, token: Address, spender: Address, amount: U256) {
            self.allowances
                .lock()
                .unwrap()
                .insert((token, spender), amount);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn sends(&self) -> Vec<Address> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Send(to) => Some(to),
                    _ => None,
                })
                .collect()
        }

        pub fn approvals(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Approve(..)))
                .count()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn busy_gate(&self) -> Result<()> {
            let remaining = self.busy_reads.load(Ordering::SeqCst);
            if remaining > 0 {
                self.busy_reads.store(remaining - 1, Ordering::SeqCst);
                return Err(Error::NodeBusy);
            }
            Ok(())
        }

        fn fresh_hash(&self) -> B256 {
            let n = self.next_hash.fetch_add(1, Ordering::SeqCst) + 1;
            B256::from(U256::from(n))
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn block_number(&self) -> Result<u64> {
            self.busy_gate()?;
            Ok(1)
        }

        async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256> {
            self.record(Call::Balance(token));
            self.busy_gate()?;
            Ok(self
                .balances
                .lock()
                .unwrap()
                .get(&token)
                .copied()
                .unwrap_or(U256::ZERO))
        }

        async fn allowance(
            &self,
            token: Address,
            _owner: Address,
            spender: Address,
        ) -> Result<U256> {
            self.record(Call::Allowance(token, spender));
            self.busy_gate()?;
            Ok(self
                .allowances
                .lock()
                .unwrap()
                .get(&(token, spender))
                .copied()
                .unwrap_or(U256::ZERO))
        }

        async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<B256> {
            self.record(Call::Approve(token, spender));
            self.set_allowance(token, spender, amount);
            Ok(self.fresh_hash())
        }

        async fn send_transaction(&self, tx: TxRequest) -> Result<B256> {
            self.record(Call::Send(tx.to));
            Ok(self.fresh_hash())
        }

        async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>> {
            self.record(Call::Receipt(hash));
            let success = !self.revert_receipts.load(Ordering::SeqCst);
            if success {
                let updates = std::mem::take(&mut *self.balances_after_confirm.lock().unwrap());
                self.balances.lock().unwrap().extend(updates);
            }
            Ok(Some(TxReceipt { hash, success }))
        }
    }

    pub fn fast_ops(client: MockChain, owner: Address) -> ChainOps<MockChain> {
        ChainOps::new(client, owner).with_timing(
            RetryPolicy::new(NODE_BUSY_ATTEMPTS, Duration::from_millis(1)),
            Duration::from_millis(100),
            Duration::from_millis(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{fast_ops, Call, MockChain};
    use super::*;
    use crate::tokens::addresses;
    use std::sync::atomic::Ordering;

    fn owner() -> Address {
        addresses::ZERO_ADDRESS
    }

    #[tokio::test]
    async fn ensure_approval_is_idempotent() {
        let chain = MockChain::new();
        chain.set_balance(addresses::USDT, U256::from(1_000_000u64));
        let ops = fast_ops(chain, owner());
        let required = U256::from(500_000u64);

        ops.ensure_approval(addresses::USDT, addresses::DODO_ROUTER, required)
            .await
            .unwrap();
        ops.ensure_approval(addresses::USDT, addresses::DODO_ROUTER, required)
            .await
            .unwrap();

        // Exactly one approval write; the second call observed the sentinel
        // allowance and performed no write.
        assert_eq!(ops.client.approvals(), 1);
    }

    #[tokio::test]
    async fn ensure_approval_skips_native_token() {
        let chain = MockChain::new();
        let ops = fast_ops(chain, owner());
        ops.ensure_approval(addresses::PHRS, addresses::DODO_ROUTER, U256::from(1u64))
            .await
            .unwrap();
        assert!(ops.client.calls().is_empty());
    }

    #[tokio::test]
    async fn ensure_approval_fails_on_insufficient_balance() {
        let chain = MockChain::new();
        chain.set_balance(addresses::USDC, U256::from(10u64));
        let ops = fast_ops(chain, owner());

        let err = ops
            .ensure_approval(addresses::USDC, addresses::DODO_ROUTER, U256::from(100u64))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));
        assert_eq!(ops.client.approvals(), 0);
    }

    #[tokio::test]
    async fn busy_retry_attempts_three_times_then_node_unavailable() {
        let chain = MockChain::new();
        chain.busy_reads.store(10, Ordering::SeqCst);
        let ops = fast_ops(chain, owner());

        let err = ops.read_balance(addresses::USDT).await.unwrap_err();
        assert!(matches!(err, Error::NodeUnavailable));
        let reads = ops
            .client
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Balance(_)))
            .count();
        assert_eq!(reads, 3);
    }

    #[tokio::test]
    async fn busy_retry_recovers_within_budget() {
        let chain = MockChain::new();
        chain.set_balance(addresses::USDT, U256::from(42u64));
        chain.busy_reads.store(2, Ordering::SeqCst);
        let ops = fast_ops(chain, owner());

        let balance = ops.read_balance(addresses::USDT).await.unwrap();
        assert_eq!(balance, U256::from(42u64));
    }

    #[tokio::test]
    async fn submit_and_confirm_reports_revert() {
        let chain = MockChain::new();
        chain.revert_receipts.store(true, Ordering::SeqCst);
        let ops = fast_ops(chain, owner());

        let tx = TxRequest::new(addresses::AQUAFLUX_NFT, Bytes::new());
        let err = ops.submit_and_confirm(tx).await.unwrap_err();
        assert!(matches!(err, Error::Reverted(_)));
    }

    #[tokio::test]
    async fn submit_and_confirm_returns_receipt() {
        let chain = MockChain::new();
        let ops = fast_ops(chain, owner());

        let tx = TxRequest::new(addresses::PRIMUS_TIP, Bytes::new()).with_value(U256::from(5u64));
        let receipt = ops.submit_and_confirm(tx).await.unwrap();
        assert!(receipt.success);
        assert_eq!(ops.client.sends(), vec![addresses::PRIMUS_TIP]);
    }
}
