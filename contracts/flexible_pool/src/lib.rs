#![no_std]

pub mod events;
pub mod rewards;

use common::{
    math::emission_is_bounded, CommonError, RegistryClient, StakingPoolInterface, TTL_EXTEND_TO,
    TTL_THRESHOLD,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, token, Address, Env,
    Symbol, I256,
};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const FACTORY: Symbol = symbol_short!("FACTORY");
const REGISTRY: Symbol = symbol_short!("REGISTRY");
const TOKEN: Symbol = symbol_short!("TOKEN");
const CREATOR: Symbol = symbol_short!("CREATOR");
const REWARD_RATE: Symbol = symbol_short!("RWD_RATE");
const DATE_START: Symbol = symbol_short!("DATE_STA");
const DATE_END: Symbol = symbol_short!("DATE_END");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const ACC_REWARD_PER_SHARE: Symbol = symbol_short!("ACC_RPS");
const LAST_UPDATE: Symbol = symbol_short!("LAST_UPD");

// Per-staker persistent storage uses tuple keys:  (prefix, staker_address)
const STAKER: Symbol = symbol_short!("STAKER");

// ── Contract errors ──────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FlexiblePoolError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 10,
    InvalidInput = 30,
    MathOverflow = 31,
    /// Deposit of a non-positive amount, or withdraw of a negative one.
    ZeroAmount = 100,
    BeforeStart = 101,
    AfterEnd = 102,
    /// Nothing staked to withdraw, or nothing claimable.
    ZeroBalance = 103,
    ExceedsBalance = 104,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// A staker's position.
///
/// `reward_debt` is the accrued total already accounted for at the last
/// interaction, kept in 256 bits like the accrued total it mirrors;
/// `pending_rewards` is settled reward the pool could not pay out yet.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    pub amount: i128,
    pub reward_debt: I256,
    pub pending_rewards: i128,
    /// When the current position was opened; kept across top-ups.
    pub timestamp: u64,
}

impl StakerInfo {
    pub fn empty(env: &Env) -> Self {
        StakerInfo {
            amount: 0,
            reward_debt: I256::from_i128(env, 0),
            pending_rewards: 0,
            timestamp: 0,
        }
    }
}

/// Live accumulator state as returned by `get_summary`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSummary {
    pub reward_tokens_per_second: i128,
    pub amount_of_tokens_staked: i128,
    pub acc_reward_per_share: i128,
    pub last_reward_timestamp: u64,
}

/// Immutable configuration written by the factory.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlexiblePoolInfo {
    pub factory: Address,
    pub registry: Address,
    pub token: Address,
    pub creator: Address,
    pub reward_tokens_per_second: i128,
    pub date_start: u64,
    pub date_end: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct FlexiblePool;

#[contractimpl]
impl FlexiblePool {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// One-shot configuration, callable only by the creating factory.
    ///
    /// * `creator`                  – pool owner who funded the reward budget.
    /// * `reward_tokens_per_second` – emission shared by all stakers.
    /// * `date_start` / `date_end`  – deposit window; emission stops at
    ///                                `date_end`.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        factory: Address,
        registry: Address,
        token: Address,
        creator: Address,
        reward_tokens_per_second: i128,
        date_start: u64,
        date_end: u64,
    ) -> Result<(), FlexiblePoolError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(FlexiblePoolError::AlreadyInitialized);
        }
        factory.require_auth();

        if reward_tokens_per_second <= 0
            || date_start >= date_end
            || !emission_is_bounded(reward_tokens_per_second, date_end - date_start)
        {
            return Err(FlexiblePoolError::InvalidInput);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&FACTORY, &factory);
        env.storage().instance().set(&REGISTRY, &registry);
        env.storage().instance().set(&TOKEN, &token);
        env.storage().instance().set(&CREATOR, &creator);
        env.storage()
            .instance()
            .set(&REWARD_RATE, &reward_tokens_per_second);
        env.storage().instance().set(&DATE_START, &date_start);
        env.storage().instance().set(&DATE_END, &date_end);
        // TOTAL_STAKED, ACC_RPS and LAST_UPD start at zero; absent keys read
        // as zero.

        events::publish_initialized(
            &env,
            factory,
            token,
            creator,
            reward_tokens_per_second,
            date_start,
            date_end,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` tokens inside the `[date_start, date_end]` window.
    ///
    /// Reward accrued on the existing position is settled into
    /// `pending_rewards` first so the new tokens never earn retroactively.
    pub fn deposit(env: Env, staker: Address, amount: i128) -> Result<(), FlexiblePoolError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(FlexiblePoolError::ZeroAmount);
        }
        let now = env.ledger().timestamp();
        if now < Self::date_start(&env)? {
            return Err(FlexiblePoolError::BeforeStart);
        }
        if now > Self::date_end(&env)? {
            return Err(FlexiblePoolError::AfterEnd);
        }

        // 1. Flush the accumulator and settle the existing position.
        let acc = Self::update_pool(&env)?;
        let mut info = Self::load_staker(&env, &staker);
        Self::settle(&env, &mut info, acc)?;

        // 2. Grow the position and the pool total.
        if info.amount == 0 {
            info.timestamp = now;
        }
        info.amount = info
            .amount
            .checked_add(amount)
            .ok_or(FlexiblePoolError::MathOverflow)?;
        info.reward_debt = rewards::accrued(&env, info.amount, acc);
        Self::save_staker(&env, &staker, &info);

        let new_total = Self::total_staked(&env)
            .checked_add(amount)
            .ok_or(FlexiblePoolError::MathOverflow)?;
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        // 3. Pull the tokens in.
        Self::token_client(&env)?.transfer(&staker, &env.current_contract_address(), &amount);

        events::publish_deposit(&env, staker, amount, new_total);

        Ok(())
    }

    /// Withdraw `amount` of principal and pay out settled reward.
    ///
    /// `amount == 0` with an open position is a pure reward claim. Reward
    /// paid is capped at the pool's reward reserve; the rest stays pending.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<(), FlexiblePoolError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount < 0 {
            return Err(FlexiblePoolError::ZeroAmount);
        }
        let mut info = Self::load_staker(&env, &staker);
        if info.amount == 0 && amount == 0 {
            return Err(FlexiblePoolError::ZeroBalance);
        }
        if amount > info.amount {
            return Err(FlexiblePoolError::ExceedsBalance);
        }

        // 1. Flush and settle.
        let acc = Self::update_pool(&env)?;
        Self::settle(&env, &mut info, acc)?;

        // 2. Size the payout against the reserve before principal leaves.
        let token = Self::token_client(&env)?;
        let reserve = Self::reward_reserve(&env, &token)?;
        let reward = info.pending_rewards.min(reserve).max(0);

        // 3. Shrink the position and the pool total.
        info.amount -= amount;
        info.pending_rewards -= reward;
        info.reward_debt = rewards::accrued(&env, info.amount, acc);
        Self::save_staker(&env, &staker, &info);

        let new_total = Self::total_staked(&env)
            .checked_sub(amount)
            .ok_or(FlexiblePoolError::MathOverflow)?;
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        // 4. Pay principal, then reward.
        let pool = env.current_contract_address();
        if amount > 0 {
            token.transfer(&pool, &staker, &amount);
        }
        if reward > 0 {
            token.transfer(&pool, &staker, &reward);
        }

        events::publish_withdraw(&env, staker.clone(), amount);
        if reward > 0 {
            events::publish_rewards_claimed(&env, staker, reward);
        }

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything owed to `staker`, capped at the reward reserve.
    ///
    /// Returns the amount actually transferred.
    pub fn claim_rewards(env: Env, staker: Address) -> Result<i128, FlexiblePoolError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let acc = Self::update_pool(&env)?;
        let mut info = Self::load_staker(&env, &staker);
        Self::settle(&env, &mut info, acc)?;

        let token = Self::token_client(&env)?;
        let reserve = Self::reward_reserve(&env, &token)?;
        let reward = info.pending_rewards.min(reserve);
        if reward <= 0 {
            return Err(FlexiblePoolError::ZeroBalance);
        }
        if reward < info.pending_rewards {
            log!(&env, "reward reserve short: owed {}, paying {}", info.pending_rewards, reward);
        }

        info.pending_rewards -= reward;
        Self::save_staker(&env, &staker, &info);

        token.transfer(&env.current_contract_address(), &staker, &reward);

        events::publish_rewards_claimed(&env, staker, reward);

        Ok(reward)
    }

    /// Reward `staker` could claim right now, ignoring the reserve cap.
    pub fn check_rewards(env: Env, staker: Address) -> Result<i128, FlexiblePoolError> {
        let info = Self::load_staker(&env, &staker);
        if info.amount == 0 && info.pending_rewards == 0 {
            return Ok(0);
        }
        let acc = Self::projected_acc(&env)?;
        rewards::owed(&env, info.amount, acc, &info.reward_debt, info.pending_rewards)
            .ok_or(FlexiblePoolError::MathOverflow)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Stored accumulator state; not projected to `now`.
    pub fn get_summary(env: Env) -> PoolSummary {
        PoolSummary {
            reward_tokens_per_second: env.storage().instance().get(&REWARD_RATE).unwrap_or(0),
            amount_of_tokens_staked: Self::total_staked(&env),
            acc_reward_per_share: env
                .storage()
                .instance()
                .get(&ACC_REWARD_PER_SHARE)
                .unwrap_or(0),
            last_reward_timestamp: env
                .storage()
                .instance()
                .get(&LAST_UPDATE)
                .unwrap_or(0),
        }
    }

    pub fn staker_info(env: Env, staker: Address) -> StakerInfo {
        Self::load_staker(&env, &staker)
    }

    pub fn pool_info(env: Env) -> Result<FlexiblePoolInfo, FlexiblePoolError> {
        Ok(FlexiblePoolInfo {
            factory: Self::get(&env, &FACTORY)?,
            registry: Self::get(&env, &REGISTRY)?,
            token: Self::get(&env, &TOKEN)?,
            creator: Self::get(&env, &CREATOR)?,
            reward_tokens_per_second: Self::get(&env, &REWARD_RATE)?,
            date_start: Self::date_start(&env)?,
            date_end: Self::date_end(&env)?,
        })
    }

    pub fn creator(env: Env) -> Result<Address, FlexiblePoolError> {
        Self::get(&env, &CREATOR)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), FlexiblePoolError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(FlexiblePoolError::NotInitialized);
        }
        Ok(())
    }

    fn get<V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>>(
        env: &Env,
        key: &Symbol,
    ) -> Result<V, FlexiblePoolError> {
        env.storage()
            .instance()
            .get(key)
            .ok_or(FlexiblePoolError::NotInitialized)
    }

    fn date_start(env: &Env) -> Result<u64, FlexiblePoolError> {
        Self::get(env, &DATE_START)
    }

    fn date_end(env: &Env) -> Result<u64, FlexiblePoolError> {
        Self::get(env, &DATE_END)
    }

    fn total_staked(env: &Env) -> i128 {
        env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
    }

    fn token_client(env: &Env) -> Result<token::Client<'_>, FlexiblePoolError> {
        let token: Address = Self::get(env, &TOKEN)?;
        Ok(token::Client::new(env, &token))
    }

    /// Tokens held beyond staked principal, i.e. what rewards can be paid from.
    fn reward_reserve(env: &Env, token: &token::Client) -> Result<i128, FlexiblePoolError> {
        let held = token.balance(&env.current_contract_address());
        let reserve = held
            .checked_sub(Self::total_staked(env))
            .ok_or(FlexiblePoolError::MathOverflow)?;
        Ok(reserve.max(0))
    }

    /// Accumulator value as of `min(now, date_end)` without writing it.
    fn projected_acc(env: &Env) -> Result<i128, FlexiblePoolError> {
        let acc: i128 = env
            .storage()
            .instance()
            .get(&ACC_REWARD_PER_SHARE)
            .unwrap_or(0);
        let last_update: u64 = env.storage().instance().get(&LAST_UPDATE).unwrap_or(0);
        let rate: i128 = Self::get(env, &REWARD_RATE)?;
        let until = rewards::last_applicable_time(env.ledger().timestamp(), Self::date_end(env)?);
        let elapsed = until.saturating_sub(last_update);

        rewards::accumulate(env, acc, rate, elapsed, Self::total_staked(env))
            .ok_or(FlexiblePoolError::MathOverflow)
    }

    /// Flush the accumulator up to `min(now, date_end)` and return it.
    fn update_pool(env: &Env) -> Result<i128, FlexiblePoolError> {
        let acc = Self::projected_acc(env)?;
        let last_update: u64 = env.storage().instance().get(&LAST_UPDATE).unwrap_or(0);
        let until = rewards::last_applicable_time(env.ledger().timestamp(), Self::date_end(env)?);

        env.storage().instance().set(&ACC_REWARD_PER_SHARE, &acc);
        env.storage()
            .instance()
            .set(&LAST_UPDATE, &until.max(last_update));

        Ok(acc)
    }

    /// Move reward accrued since the last interaction into `pending_rewards`.
    fn settle(env: &Env, info: &mut StakerInfo, acc: i128) -> Result<(), FlexiblePoolError> {
        info.pending_rewards =
            rewards::owed(env, info.amount, acc, &info.reward_debt, info.pending_rewards)
                .ok_or(FlexiblePoolError::MathOverflow)?;
        info.reward_debt = rewards::accrued(env, info.amount, acc);
        Ok(())
    }

    fn load_staker(env: &Env, staker: &Address) -> StakerInfo {
        env.storage()
            .persistent()
            .get(&(STAKER, staker.clone()))
            .unwrap_or_else(|| StakerInfo::empty(env))
    }

    fn save_staker(env: &Env, staker: &Address, info: &StakerInfo) {
        let key = (STAKER, staker.clone());
        env.storage().persistent().set(&key, info);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

#[contractimpl]
impl StakingPoolInterface for FlexiblePool {
    fn factory(env: Env) -> Result<Address, CommonError> {
        env.storage()
            .instance()
            .get(&FACTORY)
            .ok_or(CommonError::NotInitialized)
    }

    fn pool_owner(env: Env) -> Result<Address, CommonError> {
        env.storage()
            .instance()
            .get(&CREATOR)
            .ok_or(CommonError::NotInitialized)
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

#[cfg(test)]
mod test;
