//! Pharos testnet automation bot
//!
//! Drives a set of locally-held wallets through a daily plan of testnet
//! activity: AquaFlux NFT mints, DODO swaps, DVM liquidity deposits and
//! Primus tips. Wallets run strictly sequentially, each behind its own
//! egress identity, with per-wallet failure isolation and a bounded retry
//! policy around the flaky testnet node.

pub mod aquaflux;
pub mod chain;
pub mod config;
pub mod error;
pub mod net;
pub mod pipelines;
pub mod retry;
pub mod routes;
pub mod scheduler;
pub mod tasks;
pub mod tokens;
pub mod wallet;

pub use error::{Error, Result};
