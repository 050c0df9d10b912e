//! Configuration for the Pharos automation bot

pub mod rpc;

use std::time::Duration;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Hard timeout for every outbound HTTP call
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Rolling execution deadline attached to route and liquidity calls
pub const EXECUTION_DEADLINE_SECS: u64 = 600;

/// Node-busy retry: 3 total attempts, 2 s apart
pub const NODE_BUSY_ATTEMPTS: u32 = 3;
pub const NODE_BUSY_DELAY: Duration = Duration::from_secs(2);

/// Route fetch retry: 5 total attempts, 2 s apart
pub const ROUTE_FETCH_ATTEMPTS: u32 = 5;
pub const ROUTE_FETCH_DELAY: Duration = Duration::from_secs(2);

/// Confirmation polling budget and interval
pub const CONFIRM_BUDGET: Duration = Duration::from_secs(180);
pub const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Pacing delays between repeats of the same task kind
pub const MINT_PACING: Duration = Duration::from_secs(5);
pub const SWAP_LEG_PACING: Duration = Duration::from_secs(2);
pub const LIQUIDITY_PACING: Duration = Duration::from_secs(2);
pub const TIP_PACING: Duration = Duration::from_secs(2);

/// Pacing delay between wallets
pub const WALLET_PACING: Duration = Duration::from_secs(10);

/// Top-level run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc: RpcConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            rpc: RpcConfig::from_env(),
        }
    }
}
