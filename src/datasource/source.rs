//! The data source contract exposed to callers

use async_trait::async_trait;
use chrono::Utc;
use tracing::error;
use crate::{
    errors::DataSourceResult,
    pools::apply_pool_filter,
    types::{Pool, PoolUserInfo, Token},
    wallet::WalletAccount,
};
use super::base::{DataSourceCore, estimate_end_timestamp};

/// Pool, stake, token and chain-height access, uniform across ledger backends.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn core(&self) -> &DataSourceCore;

    async fn init(&self) -> DataSourceResult<()>;

    fn dispose(&self);

    async fn get_balance(&self, address: &str) -> DataSourceResult<u128>;

    /// Current network height, with failures reported.
    async fn try_get_network_block_height(&self) -> DataSourceResult<u64>;

    async fn get_pool(&self, id: u64, account: Option<&str>) -> DataSourceResult<Pool>;

    /// Every pool that could be fetched, in ascending id order.
    async fn get_pools(&self, account: Option<&str>) -> DataSourceResult<Vec<Pool>>;

    async fn get_pool_user_info(
        &self,
        pool_id: u64,
        account: Option<&str>,
    ) -> DataSourceResult<Option<PoolUserInfo>>;

    async fn get_total_pools(&self) -> DataSourceResult<u64>;

    async fn deposit(&self, pool_id: u64, amount: &str) -> DataSourceResult<bool>;

    async fn withdraw(&self, pool_id: u64, amount: &str) -> DataSourceResult<bool>;

    /// Current network height, 0 if it cannot be fetched.
    async fn get_network_block_height(&self) -> u64 {
        match self.try_get_network_block_height().await {
            Ok(height) => height,
            Err(e) => {
                error!(error = %e, "Failed to fetch network block height");
                0
            }
        }
    }

    fn get_account(&self) -> DataSourceResult<WalletAccount> {
        self.core().get_account()
    }

    async fn get_token(&self, id: &str) -> Token {
        self.core().get_token(id).await
    }

    /// Estimated unix time of `end_block`, 0 if it is not ahead of the
    /// network. An unavailable height counts as 0.
    async fn get_end_timestamp(&self, end_block: u64) -> i64 {
        if end_block == 0 {
            return 0;
        }
        let height = self.get_network_block_height().await;
        estimate_end_timestamp(end_block, height, Utc::now().timestamp())
    }

    /// All pools narrowed and ordered by the current filter values.
    async fn get_filtered_pools(&self, account: Option<&str>) -> DataSourceResult<Vec<Pool>> {
        let pools = self.get_pools(account).await?;
        Ok(apply_pool_filter(pools, &self.core().pool_filter_values()))
    }
}
