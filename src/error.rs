//! Error types for the Pharos automation bot

use alloy::primitives::B256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote error: {0}")]
    Remote(String),

    /// The node reported its internal/overloaded signal (JSON-RPC -32603).
    /// Only this variant is eligible for the chain layer's busy retry.
    #[error("RPC node busy")]
    NodeBusy,

    #[error("RPC node unavailable after retries")]
    NodeUnavailable,

    #[error("insufficient {symbol} balance: required {required}, available {available}")]
    InsufficientBalance {
        symbol: String,
        required: String,
        available: String,
    },

    #[error("transaction {0} reverted on-chain")]
    Reverted(B256),

    #[error("route service permanently failed")]
    RouteUnavailable,

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("mint signature already expired (expiresAt {expires_at} <= now {now})")]
    SignatureExpired { expires_at: u64, now: u64 },

    #[error("crafting incomplete: expected {expected} derived tokens, got {got}")]
    CraftingIncomplete { expected: String, got: String },

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the chain layer's node-busy retry policy applies.
    pub fn is_node_busy(&self) -> bool {
        matches!(self, Error::NodeBusy)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
