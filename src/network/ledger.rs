//! Ledger RPC transport

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use crate::{
    config::Config,
    errors::{DataSourceError, DataSourceResult},
    network::retry::{RetryConfig, retry_with_backoff_when},
    types::{AbiEntry, OffChainField},
};

pub const SNAPSHOT_CHAIN_HEIGHT_METHOD: &str = "ledger_getSnapshotChainHeight";
pub const CALL_OFFCHAIN_METHOD: &str = "contract_callOffChainMethod";

/// Read-only access to the ledger.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Plain JSON-RPC query such as the snapshot chain height.
    async fn request(&self, method: &str, params: Vec<Value>) -> DataSourceResult<Value>;

    /// Runs an off-chain contract method and returns its named outputs in order.
    async fn call_off_chain_method(
        &self,
        contract_address: &str,
        abi: &AbiEntry,
        off_chain_code: &str,
        args: Vec<Value>,
    ) -> DataSourceResult<Vec<OffChainField>>;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Error object returned by the node. The request reached the node and was
/// rejected, so sending it again gives the same answer.
#[derive(Debug, thiserror::Error)]
#[error("{method} returned error {code}: {message}")]
pub struct RpcFault {
    pub method: String,
    pub code: i64,
    pub message: String,
}

fn is_retryable(e: &anyhow::Error) -> bool {
    e.downcast_ref::<RpcFault>().is_none()
}

/// JSON-RPC 2.0 client for a gvite node.
pub struct HttpLedgerClient {
    client: reqwest::Client,
    url: String,
    retry: RetryConfig,
    next_id: AtomicU64,
}

impl HttpLedgerClient {
    pub fn new(url: &str, timeout: Duration, retry: RetryConfig) -> DataSourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::network("Failed to initialize RPC client", e.into()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            retry,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &Config) -> DataSourceResult<Self> {
        Self::new(
            &config.vite_rpc_url,
            Duration::from_secs(config.http_timeout_secs),
            RetryConfig::with_attempts(config.rpc_max_attempts),
        )
    }

    async fn send(&self, method: &str, params: &[Value]) -> Result<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "Sending ledger RPC request");

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send {}", method))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("Failed to read {} response", method))?;

        if let Some(error) = response.error {
            return Err(RpcFault {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            }
            .into());
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl LedgerRpc for HttpLedgerClient {
    async fn request(&self, method: &str, params: Vec<Value>) -> DataSourceResult<Value> {
        let params = params.as_slice();
        retry_with_backoff_when(|| self.send(method, params), &self.retry, method, is_retryable).await
    }

    async fn call_off_chain_method(
        &self,
        contract_address: &str,
        abi: &AbiEntry,
        off_chain_code: &str,
        args: Vec<Value>,
    ) -> DataSourceResult<Vec<OffChainField>> {
        let params = vec![json!({
            "address": contract_address,
            "code": off_chain_code,
            "abi": abi,
            "params": args,
        })];
        let context = format!("{} {}", CALL_OFFCHAIN_METHOD, abi.name.as_deref().unwrap_or("?"));
        let params = params.as_slice();
        let result = retry_with_backoff_when(
            || self.send(CALL_OFFCHAIN_METHOD, params),
            &self.retry,
            &context,
            is_retryable,
        )
        .await?;

        if result.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(result)
            .map_err(|e| DataSourceError::parsing(format!("Malformed result for {}", context), e.into()))
    }
}
