//! RPC endpoint configuration
//!
//! The bot talks to a single configurable Pharos testnet node:
//! 1. `PHAROS_RPC_URL` env var - highest priority
//! 2. Public testnet endpoint fallback

/// Environment variable overriding the RPC endpoint
pub const PHAROS_RPC_URL_ENV: &str = "PHAROS_RPC_URL";

/// Public Pharos testnet endpoint
const PUBLIC_RPC: &str = "https://testnet.dplabs-internal.com";

/// RPC configuration for the Pharos testnet
#[derive(Debug, Clone)]
pub struct RpcConfig {
    url: String,
}

impl RpcConfig {
    /// Create RPC config from environment, falling back to the public node.
    pub fn from_env() -> Self {
        Self::resolve(std::env::var(PHAROS_RPC_URL_ENV).ok())
    }

    fn resolve(override_url: Option<String>) -> Self {
        match override_url {
            Some(url) => {
                tracing::debug!("Using PHAROS_RPC_URL for the Pharos testnet");
                Self { url }
            }
            None => Self {
                url: PUBLIC_RPC.to_string(),
            },
        }
    }

    /// Create with an explicit RPC URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Get the configured RPC URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
