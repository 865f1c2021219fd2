//! Pool-related types and structures

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use super::Token;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: u64,
    pub staking_token: Token,
    pub reward_token: Token,
    pub total_staking_balance: u128,
    pub total_reward_balance: u128,
    pub start_block: u64,
    pub end_block: u64,
    pub latest_reward_block: u64,
    pub reward_per_period: u128,
    pub paid_out: u128,
    /// Estimated unix time at which `end_block` is reached, 0 if not in the future.
    pub end_timestamp: i64,
    pub apr: Option<Decimal>,
    pub user_info: Option<PoolUserInfo>,
}

impl Pool {
    pub fn is_live(&self) -> bool {
        self.end_timestamp > 0
    }

    pub fn has_user_stake(&self) -> bool {
        self.user_info
            .as_ref()
            .map(|info| info.staking_balance > 0)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolUserInfo {
    pub staking_balance: u128,
    pub reward_debt: u128,
    pub deposit_block: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolSortOrder {
    #[default]
    Default,
    Apr,
    TotalStaked,
    EndsIn,
}

/// Criteria applied to the pool list; replaced wholesale on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolFilterValues {
    pub live_only: bool,
    pub staked_only: bool,
    pub search: String,
    pub sort: PoolSortOrder,
}

impl Default for PoolFilterValues {
    fn default() -> Self {
        Self {
            live_only: true,
            staked_only: false,
            search: String::new(),
            sort: PoolSortOrder::Default,
        }
    }
}
