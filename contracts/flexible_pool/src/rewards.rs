//! Reward-per-share accumulator arithmetic.
//!
//! The pool keeps a single global accumulator `acc` scaled by
//! [`PRECISION`]. A staker holding `amount` has accrued
//! `amount * acc / PRECISION` in total; their `reward_debt` is the part of
//! that total already settled, so `accrued - reward_debt` is what they are
//! still owed.
//!
//! `acc` itself fits an `i128` as long as the emission is bounded (see
//! [`common::math::emission_is_bounded`]). Accrued totals do not: a tiny
//! early stake pushes `acc` up for everybody, so they are kept in 256 bits.

use common::math::{mul_div, wide_mul, PRECISION};
use soroban_sdk::{Env, I256};

/// Last moment rewards are emitted for: `now`, capped at the window end.
pub fn last_applicable_time(now: u64, date_end: u64) -> u64 {
    now.min(date_end)
}

/// Advance the accumulator by `elapsed` seconds of emission at `rate`
/// shared across `total_staked`.
///
/// With nothing staked the accumulator does not move; those seconds of
/// emission are never distributed. `None` on overflow.
pub fn accumulate(
    env: &Env,
    acc: i128,
    rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> Option<i128> {
    if total_staked <= 0 || elapsed == 0 {
        return Some(acc);
    }
    let emitted = rate.checked_mul(elapsed as i128)?;
    let increment = mul_div(env, emitted, PRECISION, total_staked)?;
    acc.checked_add(increment)
}

/// Total reward `amount` has accrued under accumulator value `acc`.
pub fn accrued(env: &Env, amount: i128, acc: i128) -> I256 {
    wide_mul(env, amount, acc).div(&I256::from_i128(env, PRECISION))
}

/// Reward accrued since the last settlement, on top of `pending`.
///
/// `None` if the result does not fit an `i128`.
pub fn owed(
    env: &Env,
    amount: i128,
    acc: i128,
    reward_debt: &I256,
    pending: i128,
) -> Option<i128> {
    accrued(env, amount, acc)
        .sub(reward_debt)
        .to_i128()?
        .checked_add(pending)
}
