//! Network access layer
//!
//! All outbound HTTP goes through [`HttpClient`]: one reqwest client per
//! wallet-cycle carrying the egress profile (proxy + user agent) and a hard
//! timeout that cancels the in-flight call on expiry. Failures are
//! classified into `Timeout`, `Transport` and `Remote` so callers can decide
//! retry eligibility. The layer is stateless between invocations.

pub mod egress;

use crate::{Error, Result};
use serde_json::Value;
use std::time::Duration;

pub use egress::{EgressPool, EgressProfile};

/// Thin JSON-over-HTTP client bound to one egress profile
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a client for one wallet-cycle.
    pub fn new(profile: &EgressProfile, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(profile.user_agent);

        if let Some(proxy) = &profile.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("invalid proxy URI: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { inner })
    }

    /// GET a JSON document.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .inner
            .get(url)
            .header("accept", "application/json, text/plain, */*")
            .send()
            .await
            .map_err(classify)?;
        decode_json(response).await
    }

    /// POST a JSON body (or an empty one) with an optional bearer token.
    pub async fn post_json(
        &self,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<Value> {
        let mut request = self
            .inner
            .post(url)
            .header("accept", "application/json, text/plain, */*")
            .header("accept-language", "en-US,en;q=0.5");

        if let Some(token) = bearer {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify)?;
        decode_json(response).await
    }
}

async fn decode_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Remote(format!("HTTP {status}: {body}")));
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| Error::Remote(format!("malformed JSON payload: {e}")))
}

/// Map a reqwest failure onto the retry-relevant taxonomy.
fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        Error::Transport(err.to_string())
    } else {
        Error::Remote(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_direct_profile() {
        let profile = EgressProfile::direct();
        assert!(HttpClient::new(&profile, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let profile = EgressProfile {
            proxy: Some("not a uri".to_string()),
            user_agent: "test",
        };
        let err = HttpClient::new(&profile, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
