//! Aptos fullnode REST client
//!
//! Provides access to:
//! - Account transaction history (raw payloads, normalized later)
//! - Account resources (for coin balances)

use backoff::{future::retry, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LedgerConfig;
use crate::error::{body_excerpt, Error, Result};
use crate::ledger::resources::{coin_balances, CoinBalance};

/// Aptos REST API client
pub struct AptosClient {
    /// HTTP client
    client: Client,
    /// Fullnode base URL, without trailing slash
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
    /// Initial retry delay
    retry_base_delay: Duration,
    /// Give up retrying after this long
    retry_max_elapsed: Duration,
}

impl AptosClient {
    /// Create a new client from ledger configuration
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.node_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            retry_max_elapsed: Duration::from_millis(config.retry_max_elapsed_ms),
        })
    }

    /// Transactions URL for an account
    pub fn transactions_url(&self, address: &str, limit: u32) -> String {
        format!(
            "{}/v1/accounts/{}/transactions?limit={}",
            self.base_url, address, limit
        )
    }

    /// Resources URL for an account
    pub fn resources_url(&self, address: &str) -> String {
        format!("{}/v1/accounts/{}/resources", self.base_url, address)
    }

    /// Fetch raw transactions sent by an account
    pub async fn get_transactions(&self, address: &str, limit: u32) -> Result<Vec<Value>> {
        debug!(address = %address, limit, "Fetching account transactions");
        let url = self.transactions_url(address, limit);
        let transactions = self.get_array(&url).await?;
        debug!(address = %address, count = transactions.len(), "Fetched transactions");
        Ok(transactions)
    }

    /// Fetch coin balances held by an account
    pub async fn get_coin_balances(&self, address: &str) -> Result<Vec<CoinBalance>> {
        debug!(address = %address, "Fetching account resources");
        let url = self.resources_url(address);
        let resources = self.get_array(&url).await?;
        Ok(coin_balances(&resources))
    }

    /// GET a JSON array with retry on transient failures
    async fn get_array(&self, url: &str) -> Result<Vec<Value>> {
        let backoff = ExponentialBackoff {
            initial_interval: self.retry_base_delay,
            max_interval: self.retry_base_delay * 8,
            max_elapsed_time: Some(self.retry_max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async move {
            match self.get_array_once(url).await {
                Ok(values) => Ok(values),
                Err(e) if e.is_retryable() => {
                    warn!("Retryable ledger error: {}", e);
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }

    /// Single GET attempt
    async fn get_array_once(&self, url: &str) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::LedgerTimeout(self.timeout.as_millis() as u64)
                } else {
                    Error::Ledger(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse ledger response: {}", e)))?;

        match body {
            Value::Array(values) => Ok(values),
            other => Err(Error::Serialization(format!(
                "Expected JSON array from ledger, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Error for a non-success fullnode response
fn status_error(status: StatusCode, body: &str) -> Error {
    Error::LedgerStatus {
        status: status.as_u16(),
        body: body_excerpt(body),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
