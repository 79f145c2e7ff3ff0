#![no_std]

pub mod events;

use common::{
    math::emission_is_bounded, replay, signing, CommonError, FlexiblePoolInitClient, PoolKind,
    RegistryClient,
};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, BytesN, Env, Symbol,
};

// ── Storage key constants ────────────────────────────────────────────────────

const REGISTRY: Symbol = symbol_short!("REGISTRY");
const POOL_WASM: Symbol = symbol_short!("POOL_WASM");

/// Type tag mixed into the request digest.
pub const REQUEST_TYPE: &[u8] = b"FlexiblePoolRequest";

// ── Public-facing types ──────────────────────────────────────────────────────

/// Pool-creation request, signed off-line by the registry signer.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlexiblePoolRequest {
    pub token: Address,
    pub owner: Address,
    pub reward_tokens_per_second: i128,
    /// Protocol fee paid by `owner` to the treasury.
    pub fee: i128,
    pub date_start: u64,
    pub date_end: u64,
    /// Last timestamp at which the request may be submitted.
    pub deadline: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct FlexiblePoolFactory;

#[contractimpl]
impl FlexiblePoolFactory {
    /// Bind the factory to `registry` and to the uploaded flexible pool
    /// code it deploys from.
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

    pub fn pool_wasm_hash(env: Env) -> Result<BytesN<32>, CommonError> {
        env.storage()
            .instance()
            .get(&POOL_WASM)
            .ok_or(CommonError::NotInitialized)
    }

    /// The 32-byte digest the registry signer signs for `request`.
    ///
    /// Bound to this factory instance and to the current network.
    pub fn request_digest(env: Env, request: FlexiblePoolRequest) -> BytesN<32> {
        signing::typed_digest(
            &env,
            &env.current_contract_address(),
            REQUEST_TYPE,
            &request,
        )
    }

    /// Admit a signed request and deploy the pool it describes.
    ///
    /// The pool is deployed from the stored wasm hash with the request
    /// digest as salt, so its address is fixed by the signed request. The
    /// owner pays the whole reward budget (`rate * (date_end - date_start)`)
    /// to the pool and `fee` to the treasury, both via allowances granted to
    /// this factory beforehand.
    pub fn create_pool(
        env: Env,
        request: FlexiblePoolRequest,
        signature: BytesN<64>,
    ) -> Result<Address, CommonError> {
        let registry_id = Self::registry(env.clone())?;
        let wasm_hash = Self::pool_wasm_hash(env.clone())?;
        request.owner.require_auth();

        // 1. Admission checks, cheapest first.
        if env.ledger().timestamp() > request.deadline {
            return Err(CommonError::ExpiredRequest);
        }
        if request.reward_tokens_per_second <= 0
            || request.fee < 0
            || request.date_start >= request.date_end
            || !emission_is_bounded(
                request.reward_tokens_per_second,
                request.date_end - request.date_start,
            )
        {
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

        // 2. Budgets.
        let window = (request.date_end - request.date_start) as i128;
        let rewards = request
            .reward_tokens_per_second
            .checked_mul(window)
            .ok_or(CommonError::MathOverflow)?;
        let treasury = match registry.try_treasury() {
            Ok(Ok(treasury)) => treasury,
            _ => return Err(CommonError::NotInitialized),
        };

        // 3. Deploy and configure the pool, then fund it.
        let pool = env
            .deployer()
            .with_current_contract(digest)
            .deploy_v2(wasm_hash, ());
        FlexiblePoolInitClient::new(&env, &pool).initialize(
            &factory,
            &registry_id,
            &request.token,
            &request.owner,
            &request.reward_tokens_per_second,
            &request.date_start,
            &request.date_end,
        );

        let token = token::Client::new(&env, &request.token);
        if rewards > 0 {
            token.transfer_from(&factory, &request.owner, &pool, &rewards);
        }
        if request.fee > 0 {
            token.transfer_from(&factory, &request.owner, &treasury, &request.fee);
        }

        // 4. Make it discoverable.
        registry.add_staking_pool(&factory, &pool, &request.owner, &PoolKind::Flexible);

        log!(&env, "flexible pool created: rewards {}, fee {}", rewards, request.fee);
        events::publish_pool_created(
            &env,
            pool.clone(),
            request.owner,
            request.token,
            rewards,
            request.fee,
        );

        Ok(pool)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
