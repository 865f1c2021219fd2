//! Decimal helpers for on-chain amounts

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// `10^n`, or `None` when it cannot be represented as a `Decimal`.
pub fn pow10(n: i32) -> Option<Decimal> {
    if n.unsigned_abs() > Decimal::MAX_SCALE {
        return None;
    }
    match n {
        0 => Some(dec!(1)),
        6 => Some(dec!(1_000_000)),
        8 => Some(dec!(100_000_000)),
        18 => Some(dec!(1_000_000_000_000_000_000)),
        _ => {
            let mut result = dec!(1);
            for _ in 0..n.unsigned_abs() {
                result = if n > 0 {
                    result.checked_mul(dec!(10))?
                } else {
                    result.checked_div(dec!(10))?
                };
            }
            Some(result)
        }
    }
}

/// Renders a raw amount in whole units, e.g. `1500000` with 6 decimals as `1.5`.
pub fn format_token_amount(raw: u128, decimals: u32, dp: u32) -> String {
    let text = raw.to_string();
    let decimals = decimals as usize;
    let (whole, fraction) = if text.len() > decimals {
        let (w, f) = text.split_at(text.len() - decimals);
        (w.to_string(), f.to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", text, width = decimals))
    };

    let mut fraction: String = fraction.chars().take(dp as usize).collect();
    while fraction.ends_with('0') {
        fraction.pop();
    }
    if fraction.is_empty() { whole } else { format!("{}.{}", whole, fraction) }
}
