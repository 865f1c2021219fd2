//! Pool APR calculation

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::warn;
use crate::{
    config::SECONDS_PER_BLOCK,
    network::PriceSource,
    types::Pool,
    utils::pow10,
};

/// One reward period is one block.
pub const PERIODS_PER_YEAR: i64 = 365 * 24 * 60 * 60 / SECONDS_PER_BLOCK;

/// Converts a raw on-chain amount into whole token units.
pub fn to_token_units(raw: u128, decimals: u32) -> Option<Decimal> {
    let scale = pow10(i32::try_from(decimals).ok()?)?;
    Decimal::from_u128(raw)?.checked_div(scale)
}

/// Yearly percentage return for stakers, given the value of one reward token
/// expressed in staking tokens. Ended pools have none.
pub fn calculate_apr(pool: &Pool, reward_to_staking_price: Decimal) -> Option<Decimal> {
    if pool.total_staking_balance == 0 || !pool.is_live() {
        return None;
    }
    let staked = to_token_units(pool.total_staking_balance, pool.staking_token.decimals)?;
    let reward_per_period = to_token_units(pool.reward_per_period, pool.reward_token.decimals)?;

    reward_per_period
        .checked_mul(Decimal::from(PERIODS_PER_YEAR))?
        .checked_mul(reward_to_staking_price)?
        .checked_div(staked)?
        .checked_mul(dec!(100))
        .map(|apr| apr.round_dp(2))
}

/// APR of a pool, pricing reward and staking tokens through `prices` when
/// they differ. Price failures yield `None`.
pub async fn resolve_apr(pool: &Pool, prices: Option<&dyn PriceSource>) -> Option<Decimal> {
    if pool.staking_token.id == pool.reward_token.id {
        return calculate_apr(pool, Decimal::ONE);
    }

    let prices = prices?;
    let quotes = tokio::try_join!(
        prices.token_price_usd(&pool.reward_token.id),
        prices.token_price_usd(&pool.staking_token.id),
    );
    match quotes {
        Ok((reward_price, staking_price)) => reward_price
            .checked_div(staking_price)
            .and_then(|ratio| calculate_apr(pool, ratio)),
        Err(e) => {
            warn!(pool_id = pool.id, error = %e, "Failed to price pool tokens for APR");
            None
        }
    }
}
