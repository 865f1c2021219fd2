//! Token price quotes consumed by APR calculation

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use crate::errors::{DataSourceError, DataSourceResult};

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn token_price_usd(&self, token_id: &str) -> DataSourceResult<Decimal>;
}

/// Prices known up front, e.g. pegged or presale tokens.
#[derive(Debug, Clone, Default)]
pub struct FixedPriceSource {
    prices: HashMap<String, Decimal>,
}

impl FixedPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, token_id: &str, price_usd: Decimal) -> Self {
        self.prices.insert(token_id.to_string(), price_usd);
        self
    }
}

#[async_trait]
impl PriceSource for FixedPriceSource {
    async fn token_price_usd(&self, token_id: &str) -> DataSourceResult<Decimal> {
        self.prices.get(token_id).copied().ok_or_else(|| {
            DataSourceError::network(
                format!("No price for {}", token_id),
                anyhow::anyhow!("token not quoted"),
            )
        })
    }
}
