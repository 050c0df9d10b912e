//! Wallet implementation
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - Keys are never serialized and never logged
//! - Each wallet is owned by the scheduler for one cycle at a time

use crate::{Error, Result};
use alloy::hex;
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use tracing::warn;

/// Prefix for the numbered credential entries in the environment
const PRIVATE_KEY_PREFIX: &str = "PRIVATE_KEY_";

/// A signing credential plus its derived public address
pub struct Wallet {
    /// The signer
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy provider integration
    wallet: EthereumWallet,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key.
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("invalid private key: {e}")))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer.clone());

        Ok(Self {
            signer,
            address,
            wallet,
        })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get a reference to the EthereumWallet for use with alloy providers.
    ///
    /// Safe because EthereumWallet only exposes signing operations, not the
    /// raw key.
    pub fn ethereum_wallet(&self) -> &EthereumWallet {
        &self.wallet
    }

    /// Sign an EIP-191 personal message, returning the 65-byte signature as
    /// 0x-prefixed hex. Used by the AquaFlux wallet-login exchange.
    pub async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| Error::Wallet(format!("signing failed: {e}")))?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

/// Load numbered credential entries (`PRIVATE_KEY_1`, `PRIVATE_KEY_2`, ...)
/// from the environment. Scanning stops at the first gap; malformed entries
/// are warned about and skipped.
pub fn load_wallets() -> Vec<Wallet> {
    load_wallets_with(|var| std::env::var(var).ok())
}

fn load_wallets_with(lookup: impl Fn(&str) -> Option<String>) -> Vec<Wallet> {
    let mut wallets = Vec::new();
    let mut index = 1;
    loop {
        let var = format!("{PRIVATE_KEY_PREFIX}{index}");
        let Some(raw) = lookup(&var) else {
            break;
        };
        if raw.starts_with("0x") && raw.len() == 66 {
            match Wallet::from_hex(&raw) {
                Ok(wallet) => wallets.push(wallet),
                Err(e) => warn!(entry = %var, error = %e, "invalid private key, skipping"),
            }
        } else {
            warn!(entry = %var, "invalid private key format, skipping");
        }
        index += 1;
    }
    wallets
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test private key (DO NOT use in production!)
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_hex() {
        let wallet = Wallet::from_hex(TEST_KEY).unwrap();
        assert_eq!(
            format!("{:?}", wallet.address()).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let wallet = Wallet::from_hex(TEST_KEY).unwrap();
        let debug_str = format!("{:?}", wallet);
        assert!(!debug_str.contains("ac0974bec"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_sign_message_is_hex_encoded() {
        let wallet = Wallet::from_hex(TEST_KEY).unwrap();
        let signature = wallet
            .sign_message("Sign in to AquaFlux with timestamp: 1700000000000")
            .await
            .unwrap();
        assert!(signature.starts_with("0x"));
        // 65 bytes -> 130 hex chars plus prefix
        assert_eq!(signature.len(), 132);
    }

    fn lookup_from<'a>(entries: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |var| {
            entries
                .iter()
                .find(|(key, _)| *key == var)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_load_wallets_skips_malformed_entries() {
        let entries = [
            ("PRIVATE_KEY_1", TEST_KEY),
            ("PRIVATE_KEY_2", "not-a-key"),
            ("PRIVATE_KEY_3", TEST_KEY),
        ];
        let wallets = load_wallets_with(lookup_from(&entries));
        assert_eq!(wallets.len(), 2);
    }

    #[test]
    fn test_load_wallets_stops_at_the_first_gap() {
        let entries = [("PRIVATE_KEY_1", TEST_KEY), ("PRIVATE_KEY_3", TEST_KEY)];
        let wallets = load_wallets_with(lookup_from(&entries));
        assert_eq!(wallets.len(), 1);
    }
}
