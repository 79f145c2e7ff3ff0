//! Plan arithmetic: maturity, reward shares and the early-exit split.

use common::math::{bps_of, mul_div};
use soroban_sdk::Env;

use crate::Plan;

/// Share of the principal the pool owner keeps on an early exit (5%).
pub const OWNER_PENALTY_BPS: i128 = 500;
/// Share of the principal the treasury keeps on an early exit (5%).
pub const TREASURY_PENALTY_BPS: i128 = 500;

/// Reward earned by `amount` of matured principal, pro rata to capacity.
pub fn reward_share(env: &Env, plan: &Plan, amount: i128) -> Option<i128> {
    mul_div(env, amount, plan.rewards_pool, plan.max_tokens_be_staked)
}

/// Reward share of the capacity nobody holds.
pub fn unused_reward(env: &Env, plan: &Plan) -> Option<i128> {
    reward_share(env, plan, plan.available_tokens_be_staked)
}

pub fn unlock_at(stake_date: u64, plan: &Plan) -> u64 {
    stake_date.saturating_add(plan.duration)
}

/// How an early exit splits the principal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PenaltySplit {
    pub owner: i128,
    pub treasury: i128,
    pub staker: i128,
}

pub fn penalty_split(env: &Env, amount: i128) -> Option<PenaltySplit> {
    let owner = bps_of(env, amount, OWNER_PENALTY_BPS)?;
    let treasury = bps_of(env, amount, TREASURY_PENALTY_BPS)?;
    let staker = amount.checked_sub(owner)?.checked_sub(treasury)?;
    Some(PenaltySplit {
        owner,
        treasury,
        staker,
    })
}
