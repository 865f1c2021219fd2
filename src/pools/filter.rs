//! Pool filtering and ordering

use std::cmp::Ordering;
use crate::types::{Pool, PoolFilterValues, PoolSortOrder};

fn matches_search(pool: &Pool, needle: &str) -> bool {
    [&pool.staking_token, &pool.reward_token].iter().any(|token| {
        token.symbol.to_lowercase().contains(needle) || token.name.to_lowercase().contains(needle)
    })
}

/// Ended pools (timestamp 0) sort after every live one.
fn ends_in_key(pool: &Pool) -> i64 {
    if pool.end_timestamp > 0 { pool.end_timestamp } else { i64::MAX }
}

pub fn apply_pool_filter(mut pools: Vec<Pool>, filter: &PoolFilterValues) -> Vec<Pool> {
    let needle = filter.search.trim().to_lowercase();

    pools.retain(|pool| {
        (!filter.live_only || pool.is_live())
            && (!filter.staked_only || pool.has_user_stake())
            && (needle.is_empty() || matches_search(pool, &needle))
    });

    match filter.sort {
        PoolSortOrder::Default => pools.sort_by_key(|p| p.id),
        PoolSortOrder::Apr => pools.sort_by(|a, b| match (a.apr, b.apr) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        }),
        PoolSortOrder::TotalStaked => pools.sort_by(|a, b| {
            b.total_staking_balance
                .cmp(&a.total_staking_balance)
                .then(a.id.cmp(&b.id))
        }),
        PoolSortOrder::EndsIn => pools.sort_by_key(|p| (ends_in_key(p), p.id)),
    }
    pools
}
