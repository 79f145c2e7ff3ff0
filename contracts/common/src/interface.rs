//! Cross-contract surfaces shared by the registry, the factories and the pools.
//!
//! The traits here are never implemented in this crate; they only generate
//! the client types ([`RegistryClient`], [`StakingPoolClient`] and the pool
//! initialiser clients) that callers use to reach the deployed contracts
//! without linking their code.

use soroban_sdk::{contractclient, contracttype, Address, BytesN, Env, Vec};

use crate::CommonError;

/// Which accounting regime a registered pool runs.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PoolKind {
    /// Continuous per-second accrual shared pro rata by staked balance.
    Flexible = 1,
    /// Fixed-duration plans with maturity payout and early-exit penalty.
    Locked = 2,
}

/// Parameters of one locked-pool plan as supplied at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlanConfig {
    /// Lock duration in seconds.
    pub duration: u64,
    /// Capacity: total principal the plan accepts.
    pub max_tokens_be_staked: i128,
    /// Reward budget paid pro rata to capacity.
    pub rewards_pool: i128,
    /// Protocol fee charged to the pool owner at creation.
    pub fees_pool: i128,
    /// Largest single stake.
    pub max_staking_amount: i128,
}

impl PlanConfig {
    /// Structural checks shared by the locked factory and the locked pool.
    pub fn is_valid(&self) -> bool {
        self.duration > 0
            && self.max_tokens_be_staked > 0
            && self.max_staking_amount > 0
            && self.max_staking_amount <= self.max_tokens_be_staked
            && self.rewards_pool >= 0
            && self.fees_pool >= 0
    }
}

/// `true` if `plans` is non-empty and every plan passes [`PlanConfig::is_valid`].
pub fn plans_are_valid(plans: &Vec<PlanConfig>) -> bool {
    !plans.is_empty() && plans.iter().all(|p| p.is_valid())
}

/// Registry entry points consumed by factories and pools.
#[contractclient(name = "RegistryClient")]
pub trait RegistryInterface {
    /// Protocol owner; receives emergency withdrawals.
    fn owner(env: Env) -> Result<Address, CommonError>;

    /// Fee recipient for pool-creation fees and early-exit penalties.
    fn treasury(env: Env) -> Result<Address, CommonError>;

    fn is_factory_enabled(env: Env, factory: Address) -> bool;

    /// Aborts the invocation unless `signature` is the authorized signer's
    /// ed25519 signature over `digest`.
    fn verify_authorization(
        env: Env,
        digest: BytesN<32>,
        signature: BytesN<64>,
    ) -> Result<(), CommonError>;

    fn add_staking_pool(
        env: Env,
        factory: Address,
        pool: Address,
        pool_owner: Address,
        kind: PoolKind,
    ) -> Result<(), CommonError>;
}

/// Capability surface implemented by both pool variants.
#[contractclient(name = "StakingPoolClient")]
pub trait StakingPoolInterface {
    /// Factory that initialised the pool.
    fn factory(env: Env) -> Result<Address, CommonError>;

    /// Declared owner (flexible: creator) of the pool.
    fn pool_owner(env: Env) -> Result<Address, CommonError>;

    /// Moves `amount` of `token` held by the pool to the registry owner.
    ///
    /// Bypasses all pool accounting; operational recovery only.
    fn emergency_withdraw(
        env: Env,
        caller: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), CommonError>;
}

/// One-shot initialiser of a freshly deployed flexible pool.
#[contractclient(name = "FlexiblePoolInitClient")]
pub trait FlexiblePoolInitializer {
    fn initialize(
        env: Env,
        factory: Address,
        registry: Address,
        token: Address,
        creator: Address,
        reward_tokens_per_second: i128,
        date_start: u64,
        date_end: u64,
    );
}

/// One-shot initialiser of a freshly deployed locked pool.
#[contractclient(name = "LockedPoolInitClient")]
pub trait LockedPoolInitializer {
    fn initialize(
        env: Env,
        factory: Address,
        registry: Address,
        token: Address,
        owner: Address,
        plans: Vec<PlanConfig>,
        date_start: u64,
        date_end: u64,
        fees_withdrawn: i128,
    );
}
