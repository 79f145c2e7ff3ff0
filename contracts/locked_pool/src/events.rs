#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the factory initialises the pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub factory: Address,
    pub token: Address,
    pub owner: Address,
    pub plans: u32,
    pub date_start: u64,
    pub date_end: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub plan: u32,
    pub amount: i128,
    pub unlock_at: u64,
    pub timestamp: u64,
}

/// Fired on a matured exit.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub staker: Address,
    pub plan: u32,
    pub amount: i128,
    pub reward: i128,
    pub timestamp: u64,
}

/// Fired on an early exit. `returned` is what the staker received.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedWithPenaltyEvent {
    pub staker: Address,
    pub plan: u32,
    pub amount: i128,
    pub returned: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnusedRewardsClaimedEvent {
    pub owner: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawEvent {
    pub recipient: Address,
    pub token: Address,
    pub amount: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    factory: Address,
    token: Address,
    owner: Address,
    plans: u32,
    date_start: u64,
    date_end: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            factory,
            token,
            owner,
            plans,
            date_start,
            date_end,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(env: &Env, staker: Address, plan: u32, amount: i128, unlock_at: u64) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            plan,
            amount,
            unlock_at,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(env: &Env, staker: Address, plan: u32, amount: i128, reward: i128) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), staker.clone()),
        UnstakedEvent {
            staker,
            plan,
            amount,
            reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked_with_penalty(
    env: &Env,
    staker: Address,
    plan: u32,
    amount: i128,
    returned: i128,
) {
    env.events().publish(
        (symbol_short!("PENALTY"), staker.clone()),
        UnstakedWithPenaltyEvent {
            staker,
            plan,
            amount,
            returned,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unused_rewards_claimed(env: &Env, owner: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RESCUED"), owner.clone()),
        UnusedRewardsClaimedEvent {
            owner,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_withdraw(env: &Env, recipient: Address, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("EMERGENCY"), recipient.clone()),
        EmergencyWithdrawEvent {
            recipient,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}
