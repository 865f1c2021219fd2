//! Token detail lookups against the ViteX API

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use crate::{
    config::Config,
    errors::{DataSourceError, DataSourceResult},
    network::retry::{RetryConfig, retry_with_backoff},
    types::TokenDetail,
};

#[async_trait]
pub trait TokenDetailProvider: Send + Sync {
    /// `Ok(None)` when the provider does not know the token.
    async fn get_token_detail(&self, id: &str) -> DataSourceResult<Option<TokenDetail>>;
}

#[derive(Deserialize)]
struct VitexResponse<T> {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

pub struct VitexClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl VitexClient {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryConfig) -> DataSourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::network("Failed to initialize ViteX client", e.into()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn from_config(config: &Config) -> DataSourceResult<Self> {
        Self::new(
            &config.vitex_api_url,
            Duration::from_secs(config.http_timeout_secs),
            RetryConfig::with_attempts(config.rpc_max_attempts),
        )
    }
}

#[async_trait]
impl TokenDetailProvider for VitexClient {
    async fn get_token_detail(&self, id: &str) -> DataSourceResult<Option<TokenDetail>> {
        let url = format!("{}/api/v2/token/detail", self.base_url);
        let (client, url) = (&self.client, url.as_str());
        let response: VitexResponse<TokenDetail> = retry_with_backoff(
            || async move {
                client
                    .get(url)
                    .query(&[("tokenId", id)])
                    .send()
                    .await
                    .context("Failed to request token detail")?
                    .error_for_status()?
                    .json::<VitexResponse<TokenDetail>>()
                    .await
                    .context("Failed to decode token detail")
            },
            &self.retry,
            &format!("token detail {}", id),
        )
        .await?;

        if response.code != 0 {
            debug!(
                token_id = id,
                code = response.code,
                msg = response.msg.as_deref().unwrap_or(""),
                "Token detail not available"
            );
            return Ok(None);
        }
        Ok(response.data)
    }
}
