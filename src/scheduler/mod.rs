//! Daily cycle scheduler
//!
//! Runs the configured task plan for every wallet, strictly sequentially,
//! then sleeps until the next local midnight and starts over. One wallet's
//! failure never stops the others: per-wallet setup or task errors are
//! logged, tallied into the stack-local cycle state and the loop moves on.
//!
//! The chain session behind each wallet comes from a [`ChainConnector`], the
//! seam that lets the whole loop run against a scripted client in tests.

use crate::aquaflux::AquaFluxClient;
use crate::chain::{ChainClient, ChainOps, PharosClient};
use crate::config::{
    HTTP_TIMEOUT, LIQUIDITY_PACING, MINT_PACING, SWAP_LEG_PACING, TIP_PACING, WALLET_PACING,
};
use crate::net::{EgressPool, HttpClient};
use crate::pipelines::{liquidity, mint, swap, tip};
use crate::routes::RouteResolver;
use crate::tasks::{swap_legs, TaskPlan, TaskSpec};
use crate::wallet::Wallet;
use crate::Result;
use chrono::{Days, Local, NaiveDateTime};
use std::time::Duration;
use tracing::{error, info, warn};

/// Opens the chain session for one wallet-cycle.
pub trait ChainConnector {
    type Client: ChainClient;

    fn connect(&self, wallet: &Wallet) -> Result<Self::Client>;
}

/// Production connector: one wallet-bound alloy HTTP provider per session.
pub struct RpcConnector {
    url: String,
}

impl RpcConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ChainConnector for RpcConnector {
    type Client = PharosClient;

    fn connect(&self, wallet: &Wallet) -> Result<PharosClient> {
        PharosClient::connect(&self.url, wallet)
    }
}

/// Delays between repeats of each task kind and between wallets
#[derive(Debug, Clone, Copy)]
struct Pacing {
    mint: Duration,
    swap_leg: Duration,
    liquidity: Duration,
    tip: Duration,
    wallet: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            mint: MINT_PACING,
            swap_leg: SWAP_LEG_PACING,
            liquidity: LIQUIDITY_PACING,
            tip: TIP_PACING,
            wallet: WALLET_PACING,
        }
    }
}

/// Per-cycle outcome tally; lives on the stack of one cycle only
#[derive(Debug, Default)]
struct CycleState {
    completed: usize,
    failed: usize,
}

pub struct Scheduler<N> {
    connector: N,
    wallets: Vec<Wallet>,
    plan: TaskPlan,
    pool: EgressPool,
    pacing: Pacing,
}

impl<N: ChainConnector> Scheduler<N> {
    pub fn new(connector: N, wallets: Vec<Wallet>, plan: TaskPlan, pool: EgressPool) -> Self {
        Self {
            connector,
            wallets,
            plan,
            pool,
            pacing: Pacing::default(),
        }
    }

    #[cfg(test)]
    fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run cycles forever, one per local day.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.run_cycle().await;
            let wait = time_until_next_midnight(Local::now().naive_local());
            info!(
                hours = wait.as_secs() / 3600,
                minutes = (wait.as_secs() % 3600) / 60,
                "cycle complete, sleeping until next local midnight"
            );
            tokio::time::sleep(wait).await;
        }
    }

    async fn run_cycle(&self) {
        let mut state = CycleState::default();
        info!(wallets = self.wallets.len(), "starting daily cycle");

        for (index, wallet) in self.wallets.iter().enumerate() {
            info!(
                wallet = index + 1,
                total = self.wallets.len(),
                address = %wallet.address(),
                "processing wallet"
            );
            match self.run_wallet(wallet).await {
                Ok(()) => state.completed += 1,
                Err(e) => {
                    state.failed += 1;
                    error!(address = %wallet.address(), error = %e, "wallet session failed");
                }
            }
            if index + 1 < self.wallets.len() {
                tokio::time::sleep(self.pacing.wallet).await;
            }
        }

        info!(
            completed = state.completed,
            failed = state.failed,
            "daily cycle finished"
        );
    }

    /// One wallet session: fresh egress identity, fresh chain session, then
    /// the plan's tasks in their fixed order.
    async fn run_wallet(&self, wallet: &Wallet) -> Result<()> {
        let profile = self.pool.select();
        match profile.proxy_display() {
            Some(endpoint) => info!(proxy = endpoint, "egress profile selected"),
            None => info!("egress profile selected (direct)"),
        }

        let http = HttpClient::new(&profile, HTTP_TIMEOUT)?;
        let client = self.connector.connect(wallet)?;
        let ops = ChainOps::new(client, wallet.address());
        let api = AquaFluxClient::new(http.clone());
        let resolver = RouteResolver::new(http);

        for task in self.plan.tasks() {
            match task {
                TaskSpec::Mint(task) => {
                    for attempt in 1..=task.count {
                        info!(attempt, total = task.count, "AquaFlux mint");
                        if let Err(e) = mint::run(&ops, &api, wallet).await {
                            error!(attempt, error = %e, "mint attempt failed");
                            // A failed flow almost always means the daily
                            // claim or holdings gate is spent; further
                            // attempts this session cannot succeed.
                            warn!("skipping remaining mint attempts for this wallet");
                            break;
                        }
                        if attempt < task.count {
                            tokio::time::sleep(self.pacing.mint).await;
                        }
                    }
                }
                TaskSpec::Swap(task) => {
                    let legs = swap_legs(task.cycles);
                    swap::run_batch(&ops, &resolver, &legs, self.pacing.swap_leg).await;
                }
                TaskSpec::Liquidity(task) => {
                    for attempt in 1..=task.count {
                        info!(attempt, total = task.count, "adding liquidity");
                        if let Err(e) = liquidity::run(&ops).await {
                            error!(attempt, error = %e, "liquidity attempt failed");
                        }
                        if attempt < task.count {
                            tokio::time::sleep(self.pacing.liquidity).await;
                        }
                    }
                }
                TaskSpec::Tip(task) => {
                    for attempt in 1..=task.count {
                        info!(attempt, total = task.count, recipient = %task.recipient, "tipping");
                        if let Err(e) = tip::run(&ops, &task.recipient).await {
                            error!(attempt, error = %e, "tip attempt failed");
                        }
                        if attempt < task.count {
                            tokio::time::sleep(self.pacing.tip).await;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Duration from `now` to the next local midnight.
fn time_until_next_midnight(now: NaiveDateTime) -> Duration {
    let next_midnight = now
        .date()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now);
    (next_midnight - now).to_std().unwrap_or(Duration::from_secs(1))
}
