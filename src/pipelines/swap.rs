//! Swap pipeline
//!
//! Per leg: ensure the router may spend the source token (native legs skip
//! approval), fetch a route, submit its calldata and wait for confirmation.
//! A failed leg is logged and the batch moves on; one leg must never abort
//! the remaining legs of the same batch.

use crate::chain::{ChainClient, ChainOps, TxReceipt, TxRequest};
use crate::routes::{RouteResolver, SwapRoute};
use crate::tasks::SwapLeg;
use crate::tokens::addresses;
use crate::Result;
use std::time::Duration;
use tracing::{error, info};

/// Execute every leg of a swap batch with `pacing` between legs, isolating
/// per-leg failures.
pub async fn run_batch<C: ChainClient>(
    ops: &ChainOps<C>,
    resolver: &RouteResolver,
    legs: &[SwapLeg],
    pacing: Duration,
) {
    info!(total = legs.len(), "starting swap batch");
    for (index, leg) in legs.iter().enumerate() {
        info!(
            leg = index + 1,
            total = legs.len(),
            pair = format!("{} -> {}", leg.from_symbol, leg.to_symbol),
            "executing swap leg"
        );
        if let Err(e) = run_leg(ops, resolver, leg).await {
            error!(leg = index + 1, error = %e, "swap leg failed");
        }
        if index + 1 < legs.len() {
            tokio::time::sleep(pacing).await;
        }
    }
}

/// One leg: NeedsApproval -> Approved -> RouteFetched -> Submitted -> Confirmed.
async fn run_leg<C: ChainClient>(
    ops: &ChainOps<C>,
    resolver: &RouteResolver,
    leg: &SwapLeg,
) -> Result<TxReceipt> {
    ops.ensure_approval(leg.from, addresses::DODO_ROUTER, leg.amount)
        .await?;
    let route = resolver
        .get_route(leg.from, leg.to, ops.owner(), leg.amount)
        .await?;
    execute_route(ops, &route).await
}

/// Submit a resolved route; the route is consumed exactly once.
pub(crate) async fn execute_route<C: ChainClient>(
    ops: &ChainOps<C>,
    route: &SwapRoute,
) -> Result<TxReceipt> {
    let tx = TxRequest::new(route.to, route.data.clone())
        .with_value(route.value)
        .with_gas_limit(route.gas_limit);
    ops.submit_and_confirm(tx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::{fast_ops, MockChain};
    use alloy::primitives::{Bytes, U256};

    #[tokio::test]
    async fn execute_route_submits_to_route_target() {
        let ops = fast_ops(MockChain::new(), addresses::ZERO_ADDRESS);
        let route = SwapRoute {
            to: addresses::DODO_ROUTER,
            data: Bytes::from(vec![0xab, 0xcd]),
            value: U256::from(2_450_000_000_000_000u64),
            gas_limit: 400_000,
        };

        let receipt = execute_route(&ops, &route).await.unwrap();
        assert!(receipt.success);
        assert_eq!(ops.client().sends(), vec![addresses::DODO_ROUTER]);
    }
}
