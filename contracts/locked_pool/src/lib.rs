#![no_std]

pub mod events;
pub mod payout;

use common::{
    plans_are_valid, CommonError, PlanConfig, RegistryClient, StakingPoolInterface, TTL_EXTEND_TO,
    TTL_THRESHOLD,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, token, Address, Env,
    Symbol, Vec,
};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const FACTORY: Symbol = symbol_short!("FACTORY");
const REGISTRY: Symbol = symbol_short!("REGISTRY");
const POOL_INFO: Symbol = symbol_short!("POOL");
const PLANS: Symbol = symbol_short!("PLANS");

// Per-stake persistent storage uses tuple keys:  (prefix, staker, plan_index)
const STAKE: Symbol = symbol_short!("STAKE");

// ── Contract errors ──────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LockedPoolError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 10,
    InvalidInput = 30,
    MathOverflow = 31,
    AmountCantBeZero = 100,
    PlanNotFound = 101,
    /// The staking window has not opened yet.
    DateInFuture = 102,
    /// The staking window has closed.
    DateInPast = 103,
    StakeAlreadyExists = 104,
    ExceedsStakingLimit = 105,
    PlanCapacityExceeded = 106,
    StakeNotFound = 107,
    EndOfStakeNotReached = 108,
    StakingPeriodNotEnded = 109,
    AlreadyRescued = 110,
    NothingToWithdraw = 111,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// A lock plan and its running totals.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Plan {
    pub duration: u64,
    pub max_tokens_be_staked: i128,
    pub available_tokens_be_staked: i128,
    pub rewards_pool: i128,
    pub rewards_withdrawn: i128,
    pub fees_pool: i128,
    pub max_staking_amount: i128,
}

impl Plan {
    fn from_config(config: &PlanConfig) -> Self {
        Plan {
            duration: config.duration,
            max_tokens_be_staked: config.max_tokens_be_staked,
            available_tokens_be_staked: config.max_tokens_be_staked,
            rewards_pool: config.rewards_pool,
            rewards_withdrawn: 0,
            fees_pool: config.fees_pool,
            max_staking_amount: config.max_staking_amount,
        }
    }
}

/// A staker's position in one plan. Zeroed, not removed, on exit.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakeInfo {
    pub stake_date: u64,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingPoolInfo {
    pub token: Address,
    pub owner: Address,
    pub date_start: u64,
    pub date_end: u64,
    /// Set once the owner has reclaimed unused rewards.
    pub rescued: bool,
    /// Protocol fee total the factory forwarded to the treasury when it
    /// created the pool. The fee never passes through the pool, so this is
    /// already settled (non-zero) right after creation.
    pub fees_withdrawn: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct LockedPool;

#[contractimpl]
impl LockedPool {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// One-shot configuration, callable only by the creating factory.
    ///
    /// Every plan starts fully available with nothing withdrawn.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        factory: Address,
        registry: Address,
        token: Address,
        owner: Address,
        plans: Vec<PlanConfig>,
        date_start: u64,
        date_end: u64,
        fees_withdrawn: i128,
    ) -> Result<(), LockedPoolError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(LockedPoolError::AlreadyInitialized);
        }
        factory.require_auth();

        if date_start >= date_end || !plans_are_valid(&plans) || fees_withdrawn < 0 {
            return Err(LockedPoolError::InvalidInput);
        }

        let mut stored = Vec::new(&env);
        for config in plans.iter() {
            stored.push_back(Plan::from_config(&config));
        }

        let info = StakingPoolInfo {
            token: token.clone(),
            owner: owner.clone(),
            date_start,
            date_end,
            rescued: false,
            fees_withdrawn,
        };

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&FACTORY, &factory);
        env.storage().instance().set(&REGISTRY, &registry);
        env.storage().instance().set(&POOL_INFO, &info);
        env.storage().instance().set(&PLANS, &stored);

        events::publish_initialized(
            &env,
            factory,
            token,
            owner,
            stored.len(),
            date_start,
            date_end,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Lock `amount` tokens in plan `plan_index`.
    ///
    /// Only one live stake per staker per plan; the window edges are
    /// inclusive.
    pub fn stake(
        env: Env,
        staker: Address,
        amount: i128,
        plan_index: u32,
    ) -> Result<(), LockedPoolError> {
        let info = Self::pool_info(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(LockedPoolError::AmountCantBeZero);
        }
        let mut plans = Self::plans(&env)?;
        let mut plan = plans
            .get(plan_index)
            .ok_or(LockedPoolError::PlanNotFound)?;

        let now = env.ledger().timestamp();
        if now < info.date_start {
            return Err(LockedPoolError::DateInFuture);
        }
        if now > info.date_end {
            return Err(LockedPoolError::DateInPast);
        }
        if Self::load_stake(&env, &staker, plan_index).amount > 0 {
            return Err(LockedPoolError::StakeAlreadyExists);
        }
        if amount > plan.max_staking_amount {
            return Err(LockedPoolError::ExceedsStakingLimit);
        }
        if amount > plan.available_tokens_be_staked {
            return Err(LockedPoolError::PlanCapacityExceeded);
        }

        plan.available_tokens_be_staked -= amount;
        plans.set(plan_index, plan.clone());
        env.storage().instance().set(&PLANS, &plans);

        let stake = StakeInfo {
            stake_date: now,
            amount,
        };
        Self::save_stake(&env, &staker, plan_index, &stake);

        token::Client::new(&env, &info.token).transfer(
            &staker,
            &env.current_contract_address(),
            &amount,
        );

        events::publish_staked(
            &env,
            staker,
            plan_index,
            amount,
            payout::unlock_at(now, &plan),
        );

        Ok(())
    }

    // ── Unstaking ───────────────────────────────────────────────────────────

    /// Exit a matured stake with principal plus the plan's reward share.
    pub fn unstake(env: Env, staker: Address, plan_index: u32) -> Result<(), LockedPoolError> {
        let info = Self::pool_info(&env)?;
        staker.require_auth();

        let plans = Self::plans(&env)?;
        let plan = plans
            .get(plan_index)
            .ok_or(LockedPoolError::PlanNotFound)?;
        let stake = Self::load_stake(&env, &staker, plan_index);
        if stake.amount == 0 {
            return Err(LockedPoolError::StakeNotFound);
        }
        if env.ledger().timestamp() < payout::unlock_at(stake.stake_date, &plan) {
            return Err(LockedPoolError::EndOfStakeNotReached);
        }

        Self::exit_matured(&env, &info, plans, plan, &staker, plan_index, stake)
    }

    /// Exit at any time.
    ///
    /// A matured stake exits exactly as in `unstake`. Otherwise the principal
    /// is split 5% pool owner / 5% treasury / 90% staker and no reward is
    /// paid. Inside the staking window the capacity is released for others;
    /// after it closes, the forfeited reward share goes to the pool owner.
    pub fn unstake_with_penalty(
        env: Env,
        staker: Address,
        plan_index: u32,
    ) -> Result<(), LockedPoolError> {
        let info = Self::pool_info(&env)?;
        staker.require_auth();

        let mut plans = Self::plans(&env)?;
        let mut plan = plans
            .get(plan_index)
            .ok_or(LockedPoolError::PlanNotFound)?;
        let stake = Self::load_stake(&env, &staker, plan_index);
        if stake.amount == 0 {
            return Err(LockedPoolError::StakeNotFound);
        }

        let now = env.ledger().timestamp();
        if now >= payout::unlock_at(stake.stake_date, &plan) {
            return Self::exit_matured(&env, &info, plans, plan, &staker, plan_index, stake);
        }

        let split =
            payout::penalty_split(&env, stake.amount).ok_or(LockedPoolError::MathOverflow)?;
        let mut owner_amount = split.owner;

        if now > info.date_end {
            let forfeited = payout::reward_share(&env, &plan, stake.amount)
                .ok_or(LockedPoolError::MathOverflow)?;
            plan.rewards_withdrawn = plan
                .rewards_withdrawn
                .checked_add(forfeited)
                .ok_or(LockedPoolError::MathOverflow)?;
            owner_amount = owner_amount
                .checked_add(forfeited)
                .ok_or(LockedPoolError::MathOverflow)?;
        } else {
            plan.available_tokens_be_staked = plan
                .available_tokens_be_staked
                .checked_add(stake.amount)
                .ok_or(LockedPoolError::MathOverflow)?;
        }

        plans.set(plan_index, plan);
        env.storage().instance().set(&PLANS, &plans);
        Self::save_stake(&env, &staker, plan_index, &StakeInfo::default());

        let treasury = Self::treasury(&env)?;
        let token = token::Client::new(&env, &info.token);
        let pool = env.current_contract_address();
        if owner_amount > 0 {
            token.transfer(&pool, &info.owner, &owner_amount);
        }
        if split.treasury > 0 {
            token.transfer(&pool, &treasury, &split.treasury);
        }
        if split.staker > 0 {
            token.transfer(&pool, &staker, &split.staker);
        }

        events::publish_unstaked_with_penalty(
            &env,
            staker,
            plan_index,
            stake.amount,
            split.staker,
        );

        Ok(())
    }

    // ── Owner operations ────────────────────────────────────────────────────

    /// Reclaim, once, the reward share of capacity nobody holds after the
    /// staking window closed. Returns the amount paid to the owner.
    pub fn claim_unused_rewards(env: Env, caller: Address) -> Result<i128, LockedPoolError> {
        let mut info = Self::pool_info(&env)?;
        caller.require_auth();

        if caller != info.owner {
            return Err(LockedPoolError::Unauthorized);
        }
        if env.ledger().timestamp() <= info.date_end {
            return Err(LockedPoolError::StakingPeriodNotEnded);
        }
        if info.rescued {
            return Err(LockedPoolError::AlreadyRescued);
        }

        let mut plans = Self::plans(&env)?;
        let mut total: i128 = 0;
        for i in 0..plans.len() {
            let mut plan = plans.get(i).ok_or(LockedPoolError::PlanNotFound)?;
            let unused =
                payout::unused_reward(&env, &plan).ok_or(LockedPoolError::MathOverflow)?;
            plan.rewards_withdrawn = plan
                .rewards_withdrawn
                .checked_add(unused)
                .ok_or(LockedPoolError::MathOverflow)?;
            plans.set(i, plan);
            total = total
                .checked_add(unused)
                .ok_or(LockedPoolError::MathOverflow)?;
        }
        if total == 0 {
            return Err(LockedPoolError::NothingToWithdraw);
        }

        info.rescued = true;
        env.storage().instance().set(&POOL_INFO, &info);
        env.storage().instance().set(&PLANS, &plans);

        token::Client::new(&env, &info.token).transfer(
            &env.current_contract_address(),
            &info.owner,
            &total,
        );

        log!(&env, "unused rewards reclaimed: {}", total);
        events::publish_unused_rewards_claimed(&env, info.owner, total);

        Ok(total)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_plans(env: Env) -> Result<Vec<Plan>, LockedPoolError> {
        Self::plans(&env)
    }

    pub fn get_plan(env: Env, plan_index: u32) -> Result<Plan, LockedPoolError> {
        Self::plans(&env)?
            .get(plan_index)
            .ok_or(LockedPoolError::PlanNotFound)
    }

    pub fn get_plans_length(env: Env) -> u32 {
        Self::plans(&env).map(|p| p.len()).unwrap_or(0)
    }

    pub fn staking_pool(env: Env) -> Result<StakingPoolInfo, LockedPoolError> {
        Self::pool_info(&env)
    }

    pub fn stake_info_of(env: Env, staker: Address, plan_index: u32) -> StakeInfo {
        Self::load_stake(&env, &staker, plan_index)
    }

    /// One entry per plan, zeroed where the staker holds nothing.
    pub fn stakes_info_of(env: Env, staker: Address) -> Vec<StakeInfo> {
        let mut out = Vec::new(&env);
        for i in 0..Self::get_plans_length(env.clone()) {
            out.push_back(Self::load_stake(&env, &staker, i));
        }
        out
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn pool_info(env: &Env) -> Result<StakingPoolInfo, LockedPoolError> {
        env.storage()
            .instance()
            .get(&POOL_INFO)
            .ok_or(LockedPoolError::NotInitialized)
    }

    fn plans(env: &Env) -> Result<Vec<Plan>, LockedPoolError> {
        env.storage()
            .instance()
            .get(&PLANS)
            .ok_or(LockedPoolError::NotInitialized)
    }

    fn treasury(env: &Env) -> Result<Address, LockedPoolError> {
        let registry: Address = env
            .storage()
            .instance()
            .get(&REGISTRY)
            .ok_or(LockedPoolError::NotInitialized)?;
        match RegistryClient::new(env, &registry).try_treasury() {
            Ok(Ok(treasury)) => Ok(treasury),
            _ => Err(LockedPoolError::NotInitialized),
        }
    }

    /// Pay out principal plus reward for a stake that reached maturity.
    /// Capacity stays consumed.
    fn exit_matured(
        env: &Env,
        info: &StakingPoolInfo,
        mut plans: Vec<Plan>,
        mut plan: Plan,
        staker: &Address,
        plan_index: u32,
        stake: StakeInfo,
    ) -> Result<(), LockedPoolError> {
        let reward =
            payout::reward_share(env, &plan, stake.amount).ok_or(LockedPoolError::MathOverflow)?;
        plan.rewards_withdrawn = plan
            .rewards_withdrawn
            .checked_add(reward)
            .ok_or(LockedPoolError::MathOverflow)?;
        plans.set(plan_index, plan);
        env.storage().instance().set(&PLANS, &plans);
        Self::save_stake(env, staker, plan_index, &StakeInfo::default());

        let total = stake
            .amount
            .checked_add(reward)
            .ok_or(LockedPoolError::MathOverflow)?;
        token::Client::new(env, &info.token).transfer(
            &env.current_contract_address(),
            staker,
            &total,
        );

        events::publish_unstaked(env, staker.clone(), plan_index, stake.amount, reward);

        Ok(())
    }

    fn load_stake(env: &Env, staker: &Address, plan_index: u32) -> StakeInfo {
        env.storage()
            .persistent()
            .get(&(STAKE, staker.clone(), plan_index))
            .unwrap_or_default()
    }

    fn save_stake(env: &Env, staker: &Address, plan_index: u32, stake: &StakeInfo) {
        let key = (STAKE, staker.clone(), plan_index);
        env.storage().persistent().set(&key, stake);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

#[contractimpl]
impl StakingPoolInterface for LockedPool {
    fn factory(env: Env) -> Result<Address, CommonError> {
        env.storage()
            .instance()
            .get(&FACTORY)
            .ok_or(CommonError::NotInitialized)
    }

    fn pool_owner(env: Env) -> Result<Address, CommonError> {
        Self::pool_info(&env)
            .map(|info| info.owner)
            .map_err(|_| CommonError::NotInitialized)
    }

    /// Registry-owner recovery of any token balance held by the pool.
    fn emergency_withdraw(
        env: Env,
        caller: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), CommonError> {
        caller.require_auth();

        let registry: Address = env
            .storage()
            .instance()
            .get(&REGISTRY)
            .ok_or(CommonError::NotInitialized)?;
        match RegistryClient::new(&env, &registry).try_owner() {
            Ok(Ok(owner)) if owner == caller => {}
            Ok(Ok(_)) => return Err(CommonError::Unauthorized),
            _ => return Err(CommonError::NotInitialized),
        }
        if amount <= 0 {
            return Err(CommonError::InvalidInput);
        }

        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &caller,
            &amount,
        );

        events::publish_emergency_withdraw(&env, caller, token, amount);

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
