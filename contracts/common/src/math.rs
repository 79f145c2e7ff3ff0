//! Checked integer helpers for reward and penalty arithmetic.
//!
//! Products are formed in 256 bits so that two full-range token amounts can
//! be multiplied before dividing. Helpers return `None` when the quotient
//! does not fit an `i128` or the denominator is zero, so callers can map the
//! failure onto their own error enum.

use soroban_sdk::{Env, I256};

/// Fixed-point scale of the flexible pool's reward-per-share accumulator.
pub const PRECISION: i128 = 1_000_000_000_000;

/// 100% expressed in basis points.
pub const BASIS_POINTS: i128 = 10_000;

/// `a * b` as a 256-bit integer.
pub fn wide_mul(env: &Env, a: i128, b: i128) -> I256 {
    I256::from_i128(env, a).mul(&I256::from_i128(env, b))
}

/// `a * b / denominator`, rounded toward zero.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Option<i128> {
    if denominator == 0 {
        return None;
    }
    wide_mul(env, a, b)
        .div(&I256::from_i128(env, denominator))
        .to_i128()
}

/// `amount * bps / 10_000`, rounded toward zero.
pub fn bps_of(env: &Env, amount: i128, bps: i128) -> Option<i128> {
    mul_div(env, amount, bps, BASIS_POINTS)
}

/// `true` if emitting `rate` per second for `seconds` keeps the flexible
/// accumulator representable even when a single token unit is staked.
pub fn emission_is_bounded(rate: i128, seconds: u64) -> bool {
    rate.checked_mul(seconds as i128)
        .and_then(|emitted| emitted.checked_mul(PRECISION))
        .is_some()
}
