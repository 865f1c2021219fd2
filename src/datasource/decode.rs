//! Typed decoding of off-chain call results

use anyhow::{Result, anyhow};
use serde_json::Value;
use std::collections::HashMap;
use crate::{
    errors::{DataSourceError, DataSourceResult},
    types::{OffChainField, PoolUserInfo},
};

/// Off-chain methods of the pools contract this crate knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffChainMethod {
    GetPoolCount,
    GetPoolInfo,
    GetUserInfo,
}

impl OffChainMethod {
    pub const ALL: [OffChainMethod; 3] = [
        OffChainMethod::GetPoolCount,
        OffChainMethod::GetPoolInfo,
        OffChainMethod::GetUserInfo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OffChainMethod::GetPoolCount => "getPoolCount",
            OffChainMethod::GetPoolInfo => "getPoolInfo",
            OffChainMethod::GetUserInfo => "getUserInfo",
        }
    }
}

pub type FieldMap = HashMap<String, Value>;

/// Keys the positional result by output name. A repeated name keeps the last value.
pub fn fields_from_entries(entries: Vec<OffChainField>) -> FieldMap {
    entries.into_iter().map(|f| (f.name, f.value)).collect()
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn parse_u128(value: &Value) -> Result<u128> {
    let text = value_text(value).ok_or_else(|| anyhow!("expected an integer, got {}", value))?;
    text.parse::<u128>()
        .map_err(|e| anyhow!("invalid integer '{}': {}", text, e))
}

pub fn parse_u64(value: &Value) -> Result<u64> {
    let raw = parse_u128(value)?;
    u64::try_from(raw).map_err(|_| anyhow!("integer {} does not fit in 64 bits", raw))
}

fn field<'a>(fields: &'a FieldMap, name: &str) -> DataSourceResult<&'a Value> {
    fields
        .get(name)
        .ok_or_else(|| DataSourceError::parsing(format!("Missing field '{}'", name), anyhow!("absent from result")))
}

pub fn field_u128(fields: &FieldMap, name: &str) -> DataSourceResult<u128> {
    parse_u128(field(fields, name)?)
        .map_err(|e| DataSourceError::parsing(format!("Invalid field '{}'", name), e))
}

pub fn field_u64(fields: &FieldMap, name: &str) -> DataSourceResult<u64> {
    parse_u64(field(fields, name)?)
        .map_err(|e| DataSourceError::parsing(format!("Invalid field '{}'", name), e))
}

pub fn field_string(fields: &FieldMap, name: &str) -> DataSourceResult<String> {
    value_text(field(fields, name)?)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DataSourceError::parsing(format!("Invalid field '{}'", name), anyhow!("expected a non-empty string")))
}

/// Raw `getPoolInfo` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractPool {
    pub staking_token_id: String,
    pub reward_token_id: String,
    pub total_staking_balance: u128,
    pub total_reward_balance: u128,
    pub start_block: u64,
    pub end_block: u64,
    pub latest_reward_block: u64,
    pub reward_per_period: u128,
    pub paid_out: u128,
}

impl ContractPool {
    pub fn decode(fields: &FieldMap) -> DataSourceResult<Self> {
        Ok(Self {
            staking_token_id: field_string(fields, "stakingTokenId")?,
            reward_token_id: field_string(fields, "rewardTokenId")?,
            total_staking_balance: field_u128(fields, "totalStakingBalance")?,
            total_reward_balance: field_u128(fields, "totalRewardBalance")?,
            start_block: field_u64(fields, "startBlock")?,
            end_block: field_u64(fields, "endBlock")?,
            latest_reward_block: field_u64(fields, "latestRewardBlock")?,
            reward_per_period: field_u128(fields, "rewardPerPeriod")?,
            paid_out: field_u128(fields, "paidOut")?,
        })
    }
}

/// Raw `getUserInfo` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractPoolUserInfo {
    pub staking_balance: u128,
    pub reward_debt: u128,
    pub deposit_block: u64,
}

impl ContractPoolUserInfo {
    pub fn decode(fields: &FieldMap) -> DataSourceResult<Self> {
        Ok(Self {
            staking_balance: field_u128(fields, "stakingBalance")?,
            reward_debt: field_u128(fields, "rewardDebt")?,
            deposit_block: field_u64(fields, "depositBlock")?,
        })
    }
}

impl From<ContractPoolUserInfo> for PoolUserInfo {
    fn from(raw: ContractPoolUserInfo) -> Self {
        Self {
            staking_balance: raw.staking_balance,
            reward_debt: raw.reward_debt,
            deposit_block: raw.deposit_block,
        }
    }
}

/// `getPoolCount` reports the count as its first output.
pub fn decode_pool_count(entries: &[OffChainField]) -> DataSourceResult<u64> {
    let first = entries.first().ok_or_else(|| {
        DataSourceError::parsing("Empty getPoolCount result", anyhow!("no outputs"))
    })?;
    parse_u64(&first.value).map_err(|e| DataSourceError::parsing("Invalid pool count", e))
}
