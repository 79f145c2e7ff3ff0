#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the factory initialises the pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub factory: Address,
    pub token: Address,
    pub creator: Address,
    pub reward_tokens_per_second: i128,
    pub date_start: u64,
    pub date_end: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub staker: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub staker: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired whenever settled reward actually leaves the pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsClaimedEvent {
    pub staker: Address,
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
    creator: Address,
    reward_tokens_per_second: i128,
    date_start: u64,
    date_end: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            factory,
            token,
            creator,
            reward_tokens_per_second,
            date_start,
            date_end,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposit(env: &Env, staker: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), staker.clone()),
        DepositEvent {
            staker,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdraw(env: &Env, staker: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), staker.clone()),
        WithdrawEvent {
            staker,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rewards_claimed(env: &Env, staker: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), staker.clone()),
        RewardsClaimedEvent {
            staker,
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
