//! Wallet management
//!
//! Key handling lives in [`signer`]; nothing else in the crate touches
//! private key material.

mod signer;

pub use signer::{load_wallets, Wallet};
