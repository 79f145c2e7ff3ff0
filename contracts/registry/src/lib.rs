#![no_std]

pub mod events;

use common::{
    signing, CommonError, PoolKind, RegistryInterface, StakingPoolClient, TTL_EXTEND_TO,
    TTL_THRESHOLD,
};
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, BytesN, Env, Symbol,
};

// ── Storage key constants ────────────────────────────────────────────────────

const OWNER: Symbol = symbol_short!("OWNER");
const INITIALIZED: Symbol = symbol_short!("INIT");
const TREASURY: Symbol = symbol_short!("TREASURY");
const SIGNER: Symbol = symbol_short!("SIGNER");
const POOL_COUNT: Symbol = symbol_short!("POOL_CTR");

// Persistent tuple keys:  (prefix, address)
const FACTORY_STATUS: Symbol = symbol_short!("FACTORY");
const POOL: Symbol = symbol_short!("POOL");

// ── Public-facing types ──────────────────────────────────────────────────────

/// Registration record kept for every pool a trusted factory created.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolRecord {
    pub pool: Address,
    pub factory: Address,
    pub owner: Address,
    pub kind: PoolKind,
    pub registered_at: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingRegistry;

#[contractimpl]
impl StakingRegistry {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the registry.
    ///
    /// * `owner`    – protocol owner; manages factory trust and receives
    ///                emergency withdrawals from pools.
    /// * `treasury` – recipient of creation fees and early-exit penalties.
    /// * `signer`   – ed25519 public key whose signatures authorize pool
    ///                creation requests.
    pub fn initialize(
        env: Env,
        owner: Address,
        treasury: Address,
        signer: BytesN<32>,
    ) -> Result<(), CommonError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(CommonError::AlreadyInitialized);
        }

        env.storage().instance().set(&OWNER, &owner);
        env.storage().instance().set(&TREASURY, &treasury);
        env.storage().instance().set(&SIGNER, &signer);
        env.storage().instance().set(&INITIALIZED, &true);

        events::publish_initialized(&env, owner, treasury, signer);

        Ok(())
    }

    // ── Owner operations ────────────────────────────────────────────────────

    /// Trust or distrust a factory. Only trusted factories may register pools.
    pub fn set_factory_status(
        env: Env,
        caller: Address,
        factory: Address,
        enabled: bool,
    ) -> Result<(), CommonError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let key = (FACTORY_STATUS, factory.clone());
        env.storage().persistent().set(&key, &enabled);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

        events::publish_factory_status_set(&env, factory, enabled);

        Ok(())
    }

    /// Hand ownership to `new_owner` in a single step.
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), CommonError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        env.storage().instance().set(&OWNER, &new_owner);

        events::publish_ownership_transferred(&env, caller, new_owner);

        Ok(())
    }

    pub fn set_treasury(env: Env, caller: Address, treasury: Address) -> Result<(), CommonError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        env.storage().instance().set(&TREASURY, &treasury);

        events::publish_treasury_set(&env, treasury);

        Ok(())
    }

    /// Rotate the authorized signer key. Requests signed by the previous key
    /// stop verifying immediately.
    pub fn set_signer(env: Env, caller: Address, signer: BytesN<32>) -> Result<(), CommonError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        env.storage().instance().set(&SIGNER, &signer);

        events::publish_signer_set(&env, signer);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn signer(env: Env) -> Result<BytesN<32>, CommonError> {
        env.storage()
            .instance()
            .get(&SIGNER)
            .ok_or(CommonError::NotInitialized)
    }

    pub fn get_pool(env: Env, pool: Address) -> Result<PoolRecord, CommonError> {
        env.storage()
            .persistent()
            .get(&(POOL, pool))
            .ok_or(CommonError::PoolNotFound)
    }

    pub fn pool_count(env: Env) -> u32 {
        env.storage().instance().get(&POOL_COUNT).unwrap_or(0)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if `caller` is not the stored owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), CommonError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&OWNER)
            .ok_or(CommonError::NotInitialized)?;
        if *caller != owner {
            return Err(CommonError::Unauthorized);
        }
        Ok(())
    }
}

#[contractimpl]
impl RegistryInterface for StakingRegistry {
    fn owner(env: Env) -> Result<Address, CommonError> {
        env.storage()
            .instance()
            .get(&OWNER)
            .ok_or(CommonError::NotInitialized)
    }

    fn treasury(env: Env) -> Result<Address, CommonError> {
        env.storage()
            .instance()
            .get(&TREASURY)
            .ok_or(CommonError::NotInitialized)
    }

    fn is_factory_enabled(env: Env, factory: Address) -> bool {
        env.storage()
            .persistent()
            .get(&(FACTORY_STATUS, factory))
            .unwrap_or(false)
    }

    fn verify_authorization(
        env: Env,
        digest: BytesN<32>,
        signature: BytesN<64>,
    ) -> Result<(), CommonError> {
        let signer = Self::signer(env.clone())?;
        signing::verify_digest_signature(&env, &signer, &digest, &signature);
        Ok(())
    }

    /// Record a pool created by a trusted factory and announce it.
    ///
    /// The pool must report `factory` as the contract that initialised it.
    fn add_staking_pool(
        env: Env,
        factory: Address,
        pool: Address,
        pool_owner: Address,
        kind: PoolKind,
    ) -> Result<(), CommonError> {
        factory.require_auth();

        if !Self::is_factory_enabled(env.clone(), factory.clone()) {
            return Err(CommonError::UntrustedFactory);
        }

        match StakingPoolClient::new(&env, &pool).try_factory() {
            Ok(Ok(initialised_by)) if initialised_by == factory => {}
            _ => return Err(CommonError::Unauthorized),
        }

        let key = (POOL, pool.clone());
        if env.storage().persistent().has(&key) {
            return Err(CommonError::InvalidInput);
        }

        let record = PoolRecord {
            pool: pool.clone(),
            factory: factory.clone(),
            owner: pool_owner.clone(),
            kind,
            registered_at: env.ledger().timestamp(),
        };
        env.storage().persistent().set(&key, &record);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

        let count = Self::pool_count(env.clone()).saturating_add(1);
        env.storage().instance().set(&POOL_COUNT, &count);

        events::publish_pool_added(&env, factory, pool, pool_owner, kind);

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
