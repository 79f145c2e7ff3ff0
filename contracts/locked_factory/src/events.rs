#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub registry: Address,
    pub timestamp: u64,
}

/// Fired once per admitted request, after the pool is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolCreatedEvent {
    pub pool: Address,
    pub owner: Address,
    pub token: Address,
    /// Number of plans the pool was configured with.
    pub plans: u32,
    pub rewards: i128,
    pub fee: i128,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, registry: Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            registry,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_created(
    env: &Env,
    pool: Address,
    owner: Address,
    token: Address,
    plans: u32,
    rewards: i128,
    fee: i128,
) {
    env.events().publish(
        (symbol_short!("CREATED"), pool.clone()),
        PoolCreatedEvent {
            pool,
            owner,
            token,
            plans,
            rewards,
            fee,
            timestamp: env.ledger().timestamp(),
        },
    );
}
