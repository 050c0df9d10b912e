//! Shared token and contract registry for the Pharos testnet
//!
//! Centralizes token metadata (addresses, decimals, symbols) and the fixed
//! contract addresses used by the pipelines so no module carries its own
//! copy. This module is the single source of truth for on-chain addresses.

use alloy::primitives::{address, Address, U256};
use std::collections::HashMap;

/// Token metadata
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    /// Token symbol (e.g., "PHRS", "USDT")
    pub symbol: &'static str,
    /// Number of decimals
    pub decimals: u8,
    /// Whether this is the chain's native asset (no approvals, no ERC-20 calls)
    pub native: bool,
}

/// Pharos testnet chain id
pub const PHAROS_CHAIN_ID: u64 = 688688;

/// Well-known addresses on the Pharos testnet
pub mod addresses {
    use super::*;

    /// Native PHRS sentinel used by the route API and the swap legs
    pub const PHRS: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");
    pub const USDT: Address = address!("d4071393f8716661958f766df660033b3d35fd29");
    pub const USDC: Address = address!("72df0bcd7276f2dfbac900d1ce63c272c4bccced");

    // AquaFlux token set; CS is the derived token gated by crafting
    pub const AQUAFLUX_P: Address = address!("b5d3ca5802453cc06199b9c40c855a874946a92c");
    pub const AQUAFLUX_C: Address = address!("4374fbec42e0d46e66b379c0a6072c910ef10b32");
    pub const AQUAFLUX_S: Address = address!("5df839de5e5a68ffe83b89d430dc45b1c5746851");
    pub const AQUAFLUX_CS: Address = address!("ceb29754c54b4bfbf83882cb0dcef727a259d60a");

    /// AquaFlux NFT contract (claim, craft, mint)
    pub const AQUAFLUX_NFT: Address = address!("cc8cf44e196cab28dba2d514dc7353af0efb370e");
    /// DODO swap router (spender for swap-leg approvals)
    pub const DODO_ROUTER: Address = address!("73cafc894dbfc181398264934f7be4e482fc9d40");
    /// DODO proxy taking `addDVMLiquidity` calls
    pub const LIQUIDITY_ROUTER: Address = address!("4b177aded3b8bd1d5d747f91b9e853513838cd49");
    /// DVM pool receiving the USDC/USDT deposit
    pub const DVM_POOL: Address = address!("ff7129709ebd3485c4ed4fef6dd923025d24e730");
    /// Primus tip contract
    pub const PRIMUS_TIP: Address = address!("d17512b7ec12880bd94eca9d774089ff89805f02");

    pub const ZERO_ADDRESS: Address = address!("0000000000000000000000000000000000000000");
}

/// Scale a whole-token amount by a token's decimals.
pub fn units(amount: u64, decimals: u8) -> U256 {
    U256::from(amount) * U256::from(10).pow(U256::from(decimals))
}

/// Token registry providing metadata lookups
pub struct TokenRegistry {
    tokens: HashMap<Address, TokenInfo>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        use addresses::*;

        let mut tokens = HashMap::new();
        tokens.insert(
            PHRS,
            TokenInfo {
                symbol: "PHRS",
                decimals: 18,
                native: true,
            },
        );
        tokens.insert(
            USDT,
            TokenInfo {
                symbol: "USDT",
                decimals: 6,
                native: false,
            },
        );
        tokens.insert(
            USDC,
            TokenInfo {
                symbol: "USDC",
                decimals: 6,
                native: false,
            },
        );
        tokens.insert(
            AQUAFLUX_C,
            TokenInfo {
                symbol: "C",
                decimals: 18,
                native: false,
            },
        );
        tokens.insert(
            AQUAFLUX_S,
            TokenInfo {
                symbol: "S",
                decimals: 18,
                native: false,
            },
        );
        tokens.insert(
            AQUAFLUX_CS,
            TokenInfo {
                symbol: "CS",
                decimals: 18,
                native: false,
            },
        );

        Self { tokens }
    }

    pub fn get(&self, token: &Address) -> Option<&TokenInfo> {
        self.tokens.get(token)
    }

    /// Symbol for display; falls back to the address for unknown tokens.
    pub fn symbol(&self, token: &Address) -> String {
        match self.tokens.get(token) {
            Some(info) => info.symbol.to_string(),
            None => format!("{token}"),
        }
    }

    pub fn is_native(&self, token: &Address) -> bool {
        self.tokens.get(token).map(|t| t.native).unwrap_or(false)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global token registry (lazy initialized)
static REGISTRY: std::sync::OnceLock<TokenRegistry> = std::sync::OnceLock::new();

/// Get the global token registry
pub fn registry() -> &'static TokenRegistry {
    REGISTRY.get_or_init(TokenRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrs_is_native() {
        let registry = TokenRegistry::new();
        assert!(registry.is_native(&addresses::PHRS));
        assert!(!registry.is_native(&addresses::USDT));
        assert!(!registry.is_native(&addresses::USDC));
    }

    #[test]
    fn test_token_info() {
        let registry = TokenRegistry::new();

        let usdt = registry.get(&addresses::USDT).unwrap();
        assert_eq!(usdt.symbol, "USDT");
        assert_eq!(usdt.decimals, 6);

        let cs = registry.get(&addresses::AQUAFLUX_CS).unwrap();
        assert_eq!(cs.symbol, "CS");
        assert_eq!(cs.decimals, 18);
    }

    #[test]
    fn test_unknown_token_symbol_falls_back_to_address() {
        let registry = TokenRegistry::new();
        let symbol = registry.symbol(&addresses::DVM_POOL);
        assert!(symbol.starts_with("0x"));
    }

    #[test]
    fn test_units_scaling() {
        assert_eq!(units(1, 6), U256::from(1_000_000u64));
        assert_eq!(
            units(100, 18),
            U256::from(100u64) * U256::from(10).pow(U256::from(18))
        );
    }
}
