//! AquaFlux account API client
//!
//! Third-party collaborator used by the mint pipeline: wallet-signature
//! login for a bearer token, a holdings check, and issuance of the mint
//! eligibility signature. Every response arrives in a
//! `{status, data}` envelope; anything but `status == "success"` is an API
//! error.

use crate::net::HttpClient;
use crate::wallet::Wallet;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes};
use serde_json::{json, Value};
use tracing::info;

const API_BASE: &str = "https://api.aquaflux.pro/api/v1";

/// Eligibility signature returned by the account API.
///
/// `expires_at` is a unix timestamp in seconds; the mint stage must refuse
/// to submit once it is at or past the local clock.
#[derive(Debug, Clone)]
pub struct MintPermit {
    pub nft_type: u64,
    pub expires_at: u64,
    pub signature: Bytes,
}

impl MintPermit {
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Client bound to one wallet-cycle's HTTP client
pub struct AquaFluxClient {
    http: HttpClient,
}

impl AquaFluxClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Sign a freshly timestamped message and exchange it for a session
    /// token.
    pub async fn login(&self, wallet: &Wallet) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let message = format!("Sign in to AquaFlux with timestamp: {timestamp}");
        let signature = wallet.sign_message(&message).await?;

        let body = json!({
            "address": wallet.address().to_string(),
            "message": message,
            "signature": signature,
        });
        let data = self.post("/users/wallet-login", Some(&body), None).await?;

        let token = data
            .get("accessToken")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Api("login response missing accessToken".to_string()))?;
        info!(address = %wallet.address(), "AquaFlux login successful");
        Ok(token.to_string())
    }

    /// Holdings check gating signature issuance.
    pub async fn check_token_holding(&self, access_token: &str) -> Result<bool> {
        let data = self
            .post("/users/check-token-holding", None, Some(access_token))
            .await?;
        let holding = data
            .get("isHoldingToken")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::Api("holding response missing isHoldingToken".to_string()))?;
        info!(holding, "token holding check");
        Ok(holding)
    }

    /// Obtain the mint eligibility signature for `nft_type`.
    pub async fn get_signature(
        &self,
        address: Address,
        access_token: &str,
        nft_type: u64,
    ) -> Result<MintPermit> {
        let body = json!({
            "walletAddress": address.to_string(),
            "requestedNftType": nft_type,
        });
        let data = self
            .post("/users/get-signature", Some(&body), Some(access_token))
            .await?;
        parse_permit(&data)
    }

    async fn post(&self, path: &str, body: Option<&Value>, bearer: Option<&str>) -> Result<Value> {
        let url = format!("{API_BASE}{path}");
        let envelope = self.http.post_json(&url, body, bearer).await?;
        unwrap_envelope(envelope)
    }
}

/// Unwrap the `{status, data}` envelope common to all endpoints.
fn unwrap_envelope(envelope: Value) -> Result<Value> {
    let status = envelope
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if status != "success" {
        return Err(Error::Api(format!("request failed: {envelope}")));
    }
    envelope
        .get("data")
        .cloned()
        .ok_or_else(|| Error::Api("response envelope missing data".to_string()))
}

fn parse_permit(data: &Value) -> Result<MintPermit> {
    let nft_type = data
        .get("nftType")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::Api("signature response missing nftType".to_string()))?;
    let expires_at = data
        .get("expiresAt")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::Api("signature response missing expiresAt".to_string()))?;
    let signature: Bytes = data
        .get("signature")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .parse()
        .map_err(|e| Error::Api(format!("bad signature hex: {e}")))?;

    Ok(MintPermit {
        nft_type,
        expires_at,
        signature,
    })
}
