#![allow(deprecated)] // events().publish migration tracked separately

use common::PoolKind;
use soroban_sdk::{symbol_short, Address, BytesN, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the registry is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub treasury: Address,
    pub signer: BytesN<32>,
    pub timestamp: u64,
}

/// Fired when the owner trusts or distrusts a factory.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FactoryStatusSetEvent {
    pub factory: Address,
    pub enabled: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferredEvent {
    pub previous_owner: Address,
    pub new_owner: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreasurySetEvent {
    pub treasury: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignerSetEvent {
    pub signer: BytesN<32>,
    pub timestamp: u64,
}

/// Fired when a trusted factory registers a freshly created pool. Off-chain
/// tooling locates new pools through this event.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub factory: Address,
    pub pool: Address,
    pub owner: Address,
    pub kind: PoolKind,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, owner: Address, treasury: Address, signer: BytesN<32>) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            treasury,
            signer,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_factory_status_set(env: &Env, factory: Address, enabled: bool) {
    env.events().publish(
        (symbol_short!("FACTORY"), factory.clone()),
        FactoryStatusSetEvent {
            factory,
            enabled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ownership_transferred(env: &Env, previous_owner: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWNER"), new_owner.clone()),
        OwnershipTransferredEvent {
            previous_owner,
            new_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_treasury_set(env: &Env, treasury: Address) {
    env.events().publish(
        (symbol_short!("TREASURY"),),
        TreasurySetEvent {
            treasury,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_signer_set(env: &Env, signer: BytesN<32>) {
    env.events().publish(
        (symbol_short!("SIGNER"),),
        SignerSetEvent {
            signer,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_added(
    env: &Env,
    factory: Address,
    pool: Address,
    owner: Address,
    kind: PoolKind,
) {
    env.events().publish(
        (symbol_short!("POOL_ADD"), pool.clone()),
        PoolAddedEvent {
            factory,
            pool,
            owner,
            kind,
            timestamp: env.ledger().timestamp(),
        },
    );
}
