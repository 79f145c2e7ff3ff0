#![no_std]

pub mod events;

use common::{
    plans_are_valid, replay, signing, CommonError, LockedPoolInitClient, PlanConfig, PoolKind,
    RegistryClient,
};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, BytesN, Env, Symbol,
    Vec,
};

// ── Storage key constants ────────────────────────────────────────────────────

const REGISTRY: Symbol = symbol_short!("REGISTRY");
const POOL_WASM: Symbol = symbol_short!("POOL_WASM");

/// Type tag mixed into the request digest.
pub const REQUEST_TYPE: &[u8] = b"LockedPoolRequest";

// ── Public-facing types ──────────────────────────────────────────────────────

/// Pool-creation request, signed off-line by the registry signer.
///
/// Plan parameters are parallel arrays; entry `i` of each describes plan `i`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockedPoolRequest {
    pub token: Address,
    pub owner: Address,
    pub durations: Vec<u64>,
    pub max_tokens_be_staked: Vec<i128>,
    pub rewards_pool: Vec<i128>,
    pub fees_pool: Vec<i128>,
    pub max_staking_amount: Vec<i128>,
    pub date_start: u64,
    pub date_end: u64,
    pub deadline: u64,
}

impl LockedPoolRequest {
    /// Zips the parallel arrays into plan configs.
    ///
    /// `None` if the arrays differ in length.
    fn plans(&self, env: &Env) -> Option<Vec<PlanConfig>> {
        let n = self.durations.len();
        if self.max_tokens_be_staked.len() != n
            || self.rewards_pool.len() != n
            || self.fees_pool.len() != n
            || self.max_staking_amount.len() != n
        {
            return None;
        }

        let mut plans = Vec::new(env);
        for i in 0..n {
            plans.push_back(PlanConfig {
                duration: self.durations.get(i)?,
                max_tokens_be_staked: self.max_tokens_be_staked.get(i)?,
                rewards_pool: self.rewards_pool.get(i)?,
                fees_pool: self.fees_pool.get(i)?,
                max_staking_amount: self.max_staking_amount.get(i)?,
            });
        }
        Some(plans)
    }
}

/// Sums a per-plan amount with overflow checking.
fn checked_total(
    plans: &Vec<PlanConfig>,
    f: impl Fn(&PlanConfig) -> i128,
) -> Result<i128, CommonError> {
    plans.iter().try_fold(0i128, |acc, plan| {
        acc.checked_add(f(&plan)).ok_or(CommonError::MathOverflow)
    })
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct LockedPoolFactory;

#[contractimpl]
impl LockedPoolFactory {
    pub fn initialize(
        env: Env,
        registry: Address,
        pool_wasm_hash: BytesN<32>,
    ) -> Result<(), CommonError> {
        if env.storage().instance().has(&REGISTRY) {
            return Err(CommonError::AlreadyInitialized);
        }
        env.storage().instance().set(&REGISTRY, &registry);
        env.storage().instance().set(&POOL_WASM, &pool_wasm_hash);

        events::publish_initialized(&env, registry);

        Ok(())
    }

    pub fn registry(env: Env) -> Result<Address, CommonError> {
        env.storage()
            .instance()
            .get(&REGISTRY)
            .ok_or(CommonError::NotInitialized)
    }

    /// Hash of the uploaded locked pool code `create_pool` deploys.
    pub fn pool_wasm_hash(env: Env) -> Result<BytesN<32>, CommonError> {
        env.storage()
            .instance()
            .get(&POOL_WASM)
            .ok_or(CommonError::NotInitialized)
    }

    /// The 32-byte digest the registry signer signs for `request`.
    pub fn request_digest(env: Env, request: LockedPoolRequest) -> BytesN<32> {
        signing::typed_digest(
            &env,
            &env.current_contract_address(),
            REQUEST_TYPE,
            &request,
        )
    }

    /// Admit a signed request and deploy a locked pool for it.
    ///
    /// The pool address is derived from this factory and the request
    /// digest. The owner funds every plan's `rewards_pool` into the pool and
    /// the summed `fees_pool` into the treasury.
    pub fn create_pool(
        env: Env,
        request: LockedPoolRequest,
        signature: BytesN<64>,
    ) -> Result<Address, CommonError> {
        let registry_id = Self::registry(env.clone())?;
        let wasm_hash = Self::pool_wasm_hash(env.clone())?;
        request.owner.require_auth();

        if env.ledger().timestamp() > request.deadline {
            return Err(CommonError::ExpiredRequest);
        }
        if request.date_start >= request.date_end {
            return Err(CommonError::InvalidInput);
        }
        let plans = request.plans(&env).ok_or(CommonError::InvalidInput)?;
        if !plans_are_valid(&plans) {
            return Err(CommonError::InvalidInput);
        }

        let factory = env.current_contract_address();
        let registry = RegistryClient::new(&env, &registry_id);
        if !registry.is_factory_enabled(&factory) {
            return Err(CommonError::UntrustedFactory);
        }

        let digest = Self::request_digest(env.clone(), request.clone());
        match registry.try_verify_authorization(&digest, &signature) {
            Ok(Ok(())) => {}
            _ => return Err(CommonError::InvalidSignature),
        }
        replay::consume(&env, &digest)?;

        let rewards = checked_total(&plans, |p| p.rewards_pool)?;
        let fee = checked_total(&plans, |p| p.fees_pool)?;
        let treasury = match registry.try_treasury() {
            Ok(Ok(treasury)) => treasury,
            _ => return Err(CommonError::NotInitialized),
        };

        let pool = env
            .deployer()
            .with_current_contract(digest)
            .deploy_v2(wasm_hash, ());
        LockedPoolInitClient::new(&env, &pool).initialize(
            &factory,
            &registry_id,
            &request.token,
            &request.owner,
            &plans,
            &request.date_start,
            &request.date_end,
            &fee,
        );

        let token = token::Client::new(&env, &request.token);
        if rewards > 0 {
            token.transfer_from(&factory, &request.owner, &pool, &rewards);
        }
        if fee > 0 {
            token.transfer_from(&factory, &request.owner, &treasury, &fee);
        }

        registry.add_staking_pool(&factory, &pool, &request.owner, &PoolKind::Locked);

        log!(
            &env,
            "locked pool created: {} plans, rewards {}, fee {}",
            plans.len(),
            rewards,
            fee
        );
        events::publish_pool_created(
            &env,
            pool.clone(),
            request.owner,
            request.token,
            plans.len(),
            rewards,
            fee,
        );

        Ok(pool)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
