//! DODO route/quote resolver
//!
//! Obtains a swap execution plan from the DODO route service. An attempt
//! counts as failed when the transport call errors or the envelope carries
//! the no-route sentinel (`status == -1`); after five attempts the leg is
//! terminally `RouteUnavailable`. The resolved payload is validated to carry
//! executable calldata before it reaches the chain layer.

use crate::config::{EXECUTION_DEADLINE_SECS, ROUTE_FETCH_ATTEMPTS, ROUTE_FETCH_DELAY};
use crate::net::HttpClient;
use crate::retry::{retry, RetryPolicy};
use crate::tokens::PHAROS_CHAIN_ID;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, U256};
use serde_json::Value;
use std::future::Future;
use tracing::info;

const ROUTE_API: &str = "https://api.dodoex.io/route-service/v2/widget/getdodoroute";
/// Fixed partner key the widget endpoint expects
const PARTNER_KEY: &str = "a37546505892e1a952";
/// Fixed slippage tolerance, percent
const SLIPPAGE: &str = "3.225";
/// Envelope status signalling "no route found"
const NO_ROUTE_SENTINEL: i64 = -1;
/// Fallback gas ceiling when the route omits one
pub const DEFAULT_SWAP_GAS_LIMIT: u64 = 500_000;

/// A swap execution plan; valid until its embedded deadline, consumed once
#[derive(Debug, Clone)]
pub struct SwapRoute {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: u64,
}

/// Resolver bound to one wallet-cycle's HTTP client
pub struct RouteResolver {
    http: HttpClient,
}

impl RouteResolver {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch an executable route for one swap leg.
    pub async fn get_route(
        &self,
        from_token: Address,
        to_token: Address,
        owner: Address,
        amount_in: U256,
    ) -> Result<SwapRoute> {
        let deadline = chrono::Utc::now().timestamp() as u64 + EXECUTION_DEADLINE_SECS;
        let url = route_url(from_token, to_token, owner, amount_in, deadline);

        let policy = RetryPolicy::new(ROUTE_FETCH_ATTEMPTS, ROUTE_FETCH_DELAY);
        let payload = fetch_until_routed(policy, || self.fetch_attempt(&url)).await?;
        let route = parse_route(&payload)?;
        info!(to = %route.to, gas_limit = route.gas_limit, "route resolved");
        Ok(route)
    }

    /// One fetch attempt: transport + envelope sentinel check.
    async fn fetch_attempt(&self, url: &str) -> Result<Value> {
        let envelope = self.http.get_json(url).await?;
        check_envelope(envelope)
    }
}

/// Run fetch attempts under the resolver retry policy; exhaustion is the
/// terminal `RouteUnavailable`.
async fn fetch_until_routed<F, Fut>(policy: RetryPolicy, fetch: F) -> Result<Value>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    retry(policy, |_| true, fetch)
        .await
        .map_err(|_| Error::RouteUnavailable)
}

fn route_url(
    from_token: Address,
    to_token: Address,
    owner: Address,
    amount_in: U256,
    deadline: u64,
) -> String {
    format!(
        "{ROUTE_API}?chainId={PHAROS_CHAIN_ID}&deadLine={deadline}&apikey={PARTNER_KEY}\
         &slippage={SLIPPAGE}&source=dodoV2AndMixWasm&toTokenAddress={to_token}\
         &fromTokenAddress={from_token}&userAddr={owner}&estimateGas=true&fromAmount={amount_in}"
    )
}

/// Reject sentinel/malformed envelopes, returning the nested route payload.
fn check_envelope(envelope: Value) -> Result<Value> {
    let status = envelope
        .get("status")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::Remote("route envelope missing status".to_string()))?;
    if status == NO_ROUTE_SENTINEL {
        return Err(Error::Remote("route service reported no route".to_string()));
    }
    envelope
        .get("data")
        .cloned()
        .ok_or_else(|| Error::Remote("route envelope missing data".to_string()))
}

/// Validate and decode the execution payload.
fn parse_route(payload: &Value) -> Result<SwapRoute> {
    let calldata = payload
        .get("data")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if calldata.is_empty() || calldata == "0x" {
        return Err(Error::InvalidRoute(
            "route payload has no executable calldata".to_string(),
        ));
    }
    let data: Bytes = calldata
        .parse()
        .map_err(|e| Error::InvalidRoute(format!("bad calldata hex: {e}")))?;

    let to: Address = payload
        .get("to")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .parse()
        .map_err(|e| Error::InvalidRoute(format!("bad target address: {e}")))?;

    let value = match payload.get("value") {
        Some(v) => parse_u256(v)
            .ok_or_else(|| Error::InvalidRoute("bad native value amount".to_string()))?,
        None => U256::ZERO,
    };

    let gas_limit = payload
        .get("gasLimit")
        .and_then(parse_u64)
        .unwrap_or(DEFAULT_SWAP_GAS_LIMIT);

    Ok(SwapRoute {
        to,
        data,
        value,
        gas_limit,
    })
}

// The route service is loose about numeric encodings; accept both JSON
// numbers and decimal strings.
fn parse_u256(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::addresses;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_millis(1))
    }

    fn good_payload() -> Value {
        json!({
            "to": "0x73cafc894dbfc181398264934f7be4e482fc9d40",
            "data": "0xabcdef12",
            "value": "2450000000000000",
            "gasLimit": "400000"
        })
    }

    #[test]
    fn test_url_carries_pair_and_deadline() {
        let url = route_url(
            addresses::PHRS,
            addresses::USDT,
            addresses::ZERO_ADDRESS,
            U256::from(1_000_000u64),
            1_700_000_600,
        );
        assert!(url.contains("chainId=688688"));
        assert!(url.contains("deadLine=1700000600"));
        assert!(url.contains("slippage=3.225"));
        assert!(url.contains("fromAmount=1000000"));
    }

    #[test]
    fn test_no_route_sentinel_is_a_failed_attempt() {
        let err = check_envelope(json!({ "status": -1 })).unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
    }

    #[test]
    fn test_envelope_unwraps_payload() {
        let payload = check_envelope(json!({ "status": 200, "data": good_payload() })).unwrap();
        assert_eq!(payload["gasLimit"], "400000");
    }

    #[test]
    fn test_parse_route_round_trips_fields() {
        let route = parse_route(&good_payload()).unwrap();
        assert_eq!(route.to, addresses::DODO_ROUTER);
        assert_eq!(route.value, U256::from(2_450_000_000_000_000u64));
        assert_eq!(route.gas_limit, 400_000);
    }

    #[test]
    fn test_empty_calldata_is_invalid_route() {
        let mut payload = good_payload();
        payload["data"] = json!("0x");
        let err = parse_route(&payload).unwrap_err();
        assert!(matches!(err, Error::InvalidRoute(_)));
    }

    #[test]
    fn test_missing_gas_limit_uses_fallback() {
        let mut payload = good_payload();
        payload.as_object_mut().unwrap().remove("gasLimit");
        let route = parse_route(&payload).unwrap();
        assert_eq!(route.gas_limit, DEFAULT_SWAP_GAS_LIMIT);
    }

    #[tokio::test]
    async fn test_fetch_exhaustion_is_route_unavailable() {
        let attempts = AtomicU32::new(0);
        let result = fetch_until_routed(fast_policy(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { check_envelope(json!({ "status": -1 })) }
        })
        .await;
        assert!(matches!(result, Err(Error::RouteUnavailable)));
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_fetch_recovers_after_sentinel() {
        let attempts = AtomicU32::new(0);
        let payload = fetch_until_routed(fast_policy(), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    check_envelope(json!({ "status": -1 }))
                } else {
                    check_envelope(json!({ "status": 200, "data": good_payload() }))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(parse_route(&payload).is_ok());
    }
}
