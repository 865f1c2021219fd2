//! Display and printing utilities

use chrono::{DateTime, Utc};
use tracing::info;
use crate::{types::Pool, utils::format_token_amount};

fn ends_at(pool: &Pool) -> String {
    DateTime::<Utc>::from_timestamp(pool.end_timestamp, 0)
        .filter(|_| pool.end_timestamp > 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "ended".to_string())
}

/// One summary line per pool.
pub fn pool_summary(pool: &Pool) -> String {
    let apr = pool
        .apr
        .map(|apr| format!("{:.2}%", apr))
        .unwrap_or_else(|| "n/a".to_string());
    let staked = format_token_amount(pool.total_staking_balance, pool.staking_token.decimals, 4);
    let mut line = format!(
        "#{:<3} stake {:<8} earn {:<8} staked {:>16} APR {:>9}  ends {}",
        pool.id,
        pool.staking_token.symbol,
        pool.reward_token.symbol,
        staked,
        apr,
        ends_at(pool)
    );
    if let Some(user) = &pool.user_info {
        line.push_str(&format!(
            "  mine {}",
            format_token_amount(user.staking_balance, pool.staking_token.decimals, 4)
        ));
    }
    line
}

pub fn print_pools(pools: &[Pool], network_height: u64) {
    info!("\n📊 Staking pools at height {}", network_height);
    if pools.is_empty() {
        info!("   (none)");
    }
    for pool in pools {
        info!("   {}", pool_summary(pool));
    }
    info!("");
}
