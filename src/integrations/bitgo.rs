//! Upstream wallet provider client.
//!
//! One value of [`BitGoClient`] is built per inbound request from that
//! request's bearer token and network selector; only the underlying
//! `reqwest::Client` (connection pool) is shared process-wide. The client
//! does no shape validation: success bodies are relayed as raw JSON and the
//! normalizer decides what they mean.

use reqwest::{header::ACCEPT, Method};
use serde_json::Value;
use url::Url;

use crate::{
    config::Config,
    constants::{LOG_BODY_MAX_LEN, LOG_INVOICE_PREFIX_LEN},
    error::{AppError, Result},
    network::Network,
    utils::{clean_bearer_token, redact_secret, truncate_for_log},
};

#[derive(Debug, Clone)]
pub struct BitGoClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl BitGoClient {
    pub fn new(
        http: reqwest::Client,
        config: &Config,
        bearer_token: &str,
        network: Network,
    ) -> Result<Self> {
        let token = clean_bearer_token(bearer_token);
        if token.is_empty() {
            return Err(AppError::Auth("Bearer token is empty".to_string()));
        }

        tracing::debug!(
            token = %redact_secret(&token),
            network = network.coin(),
            "initialized upstream client"
        );

        Ok(Self {
            http,
            base_url: network.base_url(config).trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Single round trip to the upstream API. No retries: a failed call is
    /// surfaced immediately to its caller.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut url = self.endpoint_url(path)?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }

        tracing::debug!(
            %method,
            path,
            query = ?query,
            body = %body.map(|b| redact_payload(b).to_string()).unwrap_or_default(),
            "upstream request"
        );

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        if !status.is_success() {
            // Error bodies are not guaranteed to be JSON; fall back to a
            // generic message rather than failing the failure path.
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(Value::as_str)
                        .map(|s| s.to_string())
                })
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
            tracing::warn!(%method, path, status = status.as_u16(), %message, "upstream error");
            return Err(AppError::Upstream(message));
        }

        let payload: Value =
            serde_json::from_str(&text).map_err(|e| AppError::Decode(e.to_string()))?;

        tracing::debug!(
            %method,
            path,
            response = %truncate_for_log(&text, LOG_BODY_MAX_LEN),
            "upstream response"
        );

        Ok(payload)
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}/api/v2{}", self.base_url, path))
            .map_err(|e| AppError::Validation(format!("Invalid upstream URL: {}", e)))
    }

    // ==================== TYPED OPERATIONS ====================

    pub async fn generate_wallet(&self, coin: &str, body: &Value) -> Result<Value> {
        self.request(
            Method::POST,
            &format!("/{}/wallet/generate", coin),
            &[],
            Some(body),
        )
        .await
    }

    pub async fn get_wallet(&self, wallet_id: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/wallet/{}", wallet_id), &[], None)
            .await
    }

    pub async fn create_invoice(&self, wallet_id: &str, body: &Value) -> Result<Value> {
        self.request(
            Method::POST,
            &format!("/wallet/{}/lightning/invoice", wallet_id),
            &[],
            Some(body),
        )
        .await
    }

    pub async fn list_invoices(&self, wallet_id: &str, limit: u32) -> Result<Value> {
        self.request(
            Method::GET,
            &format!("/wallet/{}/lightning/invoice", wallet_id),
            &[("limit", limit.to_string())],
            None,
        )
        .await
    }

    pub async fn get_invoice(&self, wallet_id: &str, payment_hash: &str) -> Result<Value> {
        self.request(
            Method::GET,
            &format!("/wallet/{}/lightning/invoice/{}", wallet_id, payment_hash),
            &[],
            None,
        )
        .await
    }

    pub async fn pay_invoice(&self, wallet_id: &str, body: &Value) -> Result<Value> {
        self.request(
            Method::POST,
            &format!("/wallet/{}/lightning/payment", wallet_id),
            &[],
            Some(body),
        )
        .await
    }

    pub async fn list_payments(&self, wallet_id: &str, limit: u32) -> Result<Value> {
        self.request(
            Method::GET,
            &format!("/wallet/{}/lightning/payment", wallet_id),
            &[("limit", limit.to_string())],
            None,
        )
        .await
    }

    pub async fn get_payment(&self, wallet_id: &str, payment_hash: &str) -> Result<Value> {
        self.request(
            Method::GET,
            &format!("/wallet/{}/lightning/payment/{}", wallet_id, payment_hash),
            &[],
            None,
        )
        .await
    }

    pub async fn list_transactions(&self, wallet_id: &str, limit: u32) -> Result<Value> {
        self.request(
            Method::GET,
            &format!("/wallet/{}/lightning/transaction", wallet_id),
            &[("limit", limit.to_string())],
            None,
        )
        .await
    }

    pub async fn get_transaction(&self, wallet_id: &str, tx_id: &str) -> Result<Value> {
        self.request(
            Method::GET,
            &format!("/wallet/{}/lightning/transaction/{}", wallet_id, tx_id),
            &[],
            None,
        )
        .await
    }

    pub async fn get_me(&self) -> Result<Value> {
        self.request(Method::GET, "/user/me", &[], None).await
    }
}

/// Copy of a request body safe to log: secrets removed, invoice strings
/// truncated.
fn redact_payload(body: &Value) -> Value {
    let mut copy = body.clone();
    if let Some(object) = copy.as_object_mut() {
        for key in ["passphrase", "passcodeEncryptionCode"] {
            if object.contains_key(key) {
                object.insert(key.to_string(), Value::String("[redacted]".to_string()));
            }
        }
        if let Some(Value::String(invoice)) = object.get("invoice") {
            let truncated = truncate_for_log(invoice, LOG_INVOICE_PREFIX_LEN);
            object.insert("invoice".to_string(), Value::String(truncated));
        }
    }
    copy
}
