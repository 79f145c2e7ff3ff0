extern crate std;

use common::CommonError;
use registry::{StakingRegistry, StakingRegistryClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, BytesN, Env, I256,
};

use crate::{FlexiblePool, FlexiblePoolClient, FlexiblePoolError, StakerInfo};

const START: u64 = 1_000;
const END: u64 = 1_030;
const RATE: i128 = 1;

// ── Test helpers ─────────────────────────────────────────────────────────────

struct Setup {
    env: Env,
    pool: FlexiblePoolClient<'static>,
    token: Address,
    owner: Address,
    creator: Address,
    factory: Address,
    registry: Address,
}

/// Provisions a registry, a SAC token and a pool running `RATE` tokens/s over
/// `[START, END]`, pre-funded with `reward_budget` reward tokens.
fn setup(reward_budget: i128) -> Setup {
    setup_with_rate(RATE, reward_budget)
}

fn setup_with_rate(rate: i128, reward_budget: i128) -> Setup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START - 100);

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let registry = env.register(StakingRegistry, ());
    let owner = Address::generate(&env);
    StakingRegistryClient::new(&env, &registry).initialize(
        &owner,
        &Address::generate(&env),
        &BytesN::from_array(&env, &[0u8; 32]),
    );

    let pool_id = env.register(FlexiblePool, ());
    let pool = FlexiblePoolClient::new(&env, &pool_id);
    let factory = Address::generate(&env);
    let creator = Address::generate(&env);
    pool.initialize(&factory, &registry, &token, &creator, &rate, &START, &END);

    if reward_budget > 0 {
        StellarAssetClient::new(&env, &token).mint(&pool_id, &reward_budget);
    }

    Setup {
        env,
        pool,
        token,
        owner,
        creator,
        factory,
        registry,
    }
}

fn staker_with(s: &Setup, amount: i128) -> Address {
    let staker = Address::generate(&s.env);
    StellarAssetClient::new(&s.env, &s.token).mint(&staker, &amount);
    staker
}

fn balance(s: &Setup, who: &Address) -> i128 {
    TokenClient::new(&s.env, &s.token).balance(who)
}

fn at(s: &Setup, ts: u64) {
    s.env.ledger().set_timestamp(ts);
}

// ── Initialisation ────────────────────────────────────────────────────────────

#[test]
fn test_initialize() {
    let s = setup(30);

    assert!(s.pool.is_initialized());
    assert_eq!(s.pool.creator(), s.creator);
    assert_eq!(s.pool.factory(), s.factory);
    assert_eq!(s.pool.pool_owner(), s.creator);

    let info = s.pool.pool_info();
    assert_eq!(info.registry, s.registry);
    assert_eq!(info.token, s.token);
    assert_eq!(info.reward_tokens_per_second, RATE);
    assert_eq!(info.date_start, START);
    assert_eq!(info.date_end, END);

    let summary = s.pool.get_summary();
    assert_eq!(summary.reward_tokens_per_second, RATE);
    assert_eq!(summary.amount_of_tokens_staked, 0);
    assert_eq!(summary.acc_reward_per_share, 0);
    assert_eq!(summary.last_reward_timestamp, 0);

    let result = s.pool.try_initialize(
        &s.factory,
        &s.registry,
        &s.token,
        &s.creator,
        &RATE,
        &START,
        &END,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::AlreadyInitialized),
        _ => unreachable!("Expected AlreadyInitialized error"),
    }
}

#[test]
fn test_initialize_rejects_bad_window() {
    let env = Env::default();
    env.mock_all_auths();
    let pool = FlexiblePoolClient::new(&env, &env.register(FlexiblePool, ()));
    let a = Address::generate(&env);

    match pool.try_initialize(&a, &a, &a, &a, &RATE, &END, &START) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
    match pool.try_initialize(&a, &a, &a, &a, &0, &START, &END) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
}

#[test]
fn test_initialize_rejects_unbounded_emission() {
    let env = Env::default();
    env.mock_all_auths();
    let pool = FlexiblePoolClient::new(&env, &env.register(FlexiblePool, ()));
    let a = Address::generate(&env);
    let rate = i128::MAX / common::math::PRECISION;

    match pool.try_initialize(&a, &a, &a, &a, &rate, &START, &END) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
}

#[test]
fn test_uninitialised_pool_rejects_deposit() {
    let env = Env::default();
    env.mock_all_auths();
    let pool = FlexiblePoolClient::new(&env, &env.register(FlexiblePool, ()));
    let staker = Address::generate(&env);

    match pool.try_deposit(&staker, &10) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::NotInitialized),
        _ => unreachable!("Expected NotInitialized error"),
    }
}

#[test]
fn test_empty_staker_info() {
    let s = setup(30);
    let bob = Address::generate(&s.env);

    assert_eq!(s.pool.staker_info(&bob), StakerInfo::empty(&s.env));
    assert_eq!(s.pool.check_rewards(&bob), 0);
}

// ── Deposits ──────────────────────────────────────────────────────────────────

#[test]
fn test_deposit_zero_fails() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);

    match s.pool.try_deposit(&bob, &0) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::ZeroAmount),
        _ => unreachable!("Expected ZeroAmount error"),
    }
}

#[test]
fn test_deposit_outside_window_fails() {
    let s = setup(30);
    let bob = staker_with(&s, 200);

    at(&s, START - 1);
    match s.pool.try_deposit(&bob, &1) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::BeforeStart),
        _ => unreachable!("Expected BeforeStart error"),
    }

    at(&s, END + 1);
    match s.pool.try_deposit(&bob, &1) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::AfterEnd),
        _ => unreachable!("Expected AfterEnd error"),
    }

    // Both window edges are inclusive.
    at(&s, END);
    s.pool.deposit(&bob, &1);
    assert_eq!(s.pool.staker_info(&bob).amount, 1);
}

#[test]
fn test_deposit_records_position() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);

    s.pool.deposit(&bob, &200);

    let info = s.pool.staker_info(&bob);
    assert_eq!(info.amount, 200);
    assert_eq!(info.reward_debt, I256::from_i128(&s.env, 0));
    assert_eq!(info.pending_rewards, 0);
    assert_eq!(info.timestamp, START);

    let summary = s.pool.get_summary();
    assert_eq!(summary.amount_of_tokens_staked, 200);
    assert_eq!(summary.last_reward_timestamp, START);
    assert_eq!(balance(&s, &bob), 0);
    assert_eq!(balance(&s, &s.pool.address), 230);
}

#[test]
fn test_top_up_keeps_open_timestamp() {
    let s = setup(30);
    let bob = staker_with(&s, 300);

    at(&s, START);
    s.pool.deposit(&bob, &200);
    at(&s, START + 4);
    s.pool.deposit(&bob, &100);

    let info = s.pool.staker_info(&bob);
    assert_eq!(info.amount, 300);
    assert_eq!(info.timestamp, START);
    // The 4 seconds at 200 staked are settled into pending.
    assert_eq!(info.pending_rewards, 4);
}

// ── Reward accrual ────────────────────────────────────────────────────────────

#[test]
fn test_single_staker_accrues_rate() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    assert_eq!(s.pool.check_rewards(&bob), 0);
    at(&s, START + 5);
    assert_eq!(s.pool.check_rewards(&bob), 5);
}

#[test]
fn test_pro_rata_split_between_stakers() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    let alice = staker_with(&s, 50);

    at(&s, START);
    s.pool.deposit(&bob, &200);
    at(&s, START + 6);
    s.pool.deposit(&alice, &50);

    let summary = s.pool.get_summary();
    assert_eq!(summary.amount_of_tokens_staked, 250);
    assert_eq!(summary.acc_reward_per_share, 30_000_000_000);
    assert_eq!(summary.last_reward_timestamp, START + 6);

    // 10 seconds at 1/s split 200:50.
    at(&s, START + 16);
    assert_eq!(s.pool.check_rewards(&alice), 2);
    assert_eq!(s.pool.check_rewards(&bob), 14);
}

#[test]
fn test_emission_stops_at_window_end() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    at(&s, END + 5);
    assert_eq!(s.pool.check_rewards(&bob), 30);

    assert_eq!(s.pool.claim_rewards(&bob), 30);
    assert_eq!(s.pool.check_rewards(&bob), 0);
    assert_eq!(s.pool.get_summary().last_reward_timestamp, END);
}

#[test]
fn test_empty_pool_seconds_are_not_distributed() {
    let s = setup(30);
    let bob = staker_with(&s, 200);

    at(&s, START + 10);
    s.pool.deposit(&bob, &200);
    at(&s, START + 20);

    assert_eq!(s.pool.check_rewards(&bob), 10);
}

// ── Claims ────────────────────────────────────────────────────────────────────

#[test]
fn test_claim_pays_and_updates_debt() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    at(&s, START + 9);
    assert_eq!(s.pool.claim_rewards(&bob), 9);
    assert_eq!(balance(&s, &bob), 9);

    let info = s.pool.staker_info(&bob);
    assert_eq!(info.amount, 200);
    assert_eq!(info.reward_debt, I256::from_i128(&s.env, 9));
    assert_eq!(info.pending_rewards, 0);
    assert_eq!(info.timestamp, START);

    let summary = s.pool.get_summary();
    assert_eq!(summary.acc_reward_per_share, 45_000_000_000);
    assert_eq!(summary.last_reward_timestamp, START + 9);

    // Nothing new accrued in the same second.
    match s.pool.try_claim_rewards(&bob) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::ZeroBalance),
        _ => unreachable!("Expected ZeroBalance error"),
    }

    at(&s, START + 10);
    assert_eq!(s.pool.claim_rewards(&bob), 1);
}

#[test]
fn test_claim_is_capped_by_reserve() {
    let s = setup(10);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    at(&s, START + 20);
    assert_eq!(s.pool.claim_rewards(&bob), 10);

    let info = s.pool.staker_info(&bob);
    assert_eq!(info.pending_rewards, 10);
    assert_eq!(info.reward_debt, I256::from_i128(&s.env, 20));
    // Principal is never used to pay rewards.
    assert_eq!(balance(&s, &s.pool.address), 200);

    match s.pool.try_claim_rewards(&bob) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::ZeroBalance),
        _ => unreachable!("Expected ZeroBalance error"),
    }

    StellarAssetClient::new(&s.env, &s.token).mint(&s.pool.address, &10);
    assert_eq!(s.pool.claim_rewards(&bob), 10);
    assert_eq!(s.pool.staker_info(&bob).pending_rewards, 0);
}

#[test]
fn test_claim_without_position_fails() {
    let s = setup(30);
    let bob = Address::generate(&s.env);
    at(&s, START + 1);

    match s.pool.try_claim_rewards(&bob) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::ZeroBalance),
        _ => unreachable!("Expected ZeroBalance error"),
    }
}

// ── Withdrawals ───────────────────────────────────────────────────────────────

#[test]
fn test_full_withdraw_returns_principal_and_reward() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    at(&s, START + 10);
    s.pool.withdraw(&bob, &200);

    assert_eq!(balance(&s, &bob), 210);
    assert_eq!(balance(&s, &s.pool.address), 20);

    let info = s.pool.staker_info(&bob);
    assert_eq!(info.amount, 0);
    assert_eq!(info.reward_debt, I256::from_i128(&s.env, 0));
    assert_eq!(info.pending_rewards, 0);
    assert_eq!(s.pool.get_summary().amount_of_tokens_staked, 0);
}

#[test]
fn test_partial_withdraw_keeps_earning() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    at(&s, START + 4);
    s.pool.withdraw(&bob, &100);
    assert_eq!(balance(&s, &bob), 104);

    at(&s, START + 10);
    assert_eq!(s.pool.check_rewards(&bob), 6);
}

#[test]
fn test_zero_withdraw_acts_as_claim() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    at(&s, START + 3);
    s.pool.withdraw(&bob, &0);

    assert_eq!(balance(&s, &bob), 3);
    assert_eq!(s.pool.staker_info(&bob).amount, 200);
}

#[test]
fn test_withdraw_errors() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);

    match s.pool.try_withdraw(&bob, &0) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::ZeroBalance),
        _ => unreachable!("Expected ZeroBalance error"),
    }

    s.pool.deposit(&bob, &200);

    match s.pool.try_withdraw(&bob, &201) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::ExceedsBalance),
        _ => unreachable!("Expected ExceedsBalance error"),
    }
    match s.pool.try_withdraw(&bob, &-1) {
        Err(Ok(e)) => assert_eq!(e, FlexiblePoolError::ZeroAmount),
        _ => unreachable!("Expected ZeroAmount error"),
    }
}

#[test]
fn test_withdraw_with_short_reserve_keeps_reward_pending() {
    let s = setup(5);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);

    at(&s, START + 12);
    s.pool.withdraw(&bob, &200);

    assert_eq!(balance(&s, &bob), 205);
    let info = s.pool.staker_info(&bob);
    assert_eq!(info.amount, 0);
    assert_eq!(info.pending_rewards, 7);
    assert_eq!(s.pool.check_rewards(&bob), 7);
}

#[test]
fn test_reopened_position_gets_new_timestamp() {
    let s = setup(30);
    let bob = staker_with(&s, 200);
    at(&s, START);
    s.pool.deposit(&bob, &200);
    at(&s, START + 5);
    s.pool.withdraw(&bob, &200);

    at(&s, START + 8);
    s.pool.deposit(&bob, &100);
    assert_eq!(s.pool.staker_info(&bob).timestamp, START + 8);
}

// ── Emergency withdraw ────────────────────────────────────────────────────────

#[test]
fn test_registry_owner_can_emergency_withdraw() {
    let s = setup(30);
    s.pool.emergency_withdraw(&s.owner, &s.token, &25);

    assert_eq!(balance(&s, &s.owner), 25);
    assert_eq!(balance(&s, &s.pool.address), 5);
}

#[test]
fn test_emergency_withdraw_rejects_others() {
    let s = setup(30);

    match s.pool.try_emergency_withdraw(&s.creator, &s.token, &1) {
        Err(Ok(e)) => assert_eq!(e, CommonError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    match s.pool.try_emergency_withdraw(&s.owner, &s.token, &0) {
        Err(Ok(e)) => assert_eq!(e, CommonError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
}

// ── Large amounts ─────────────────────────────────────────────────────────────

#[test]
fn test_dust_stake_does_not_lock_out_later_depositors() {
    let unit = 10i128.pow(18);
    let s = setup_with_rate(unit, unit * 30);
    let dust = staker_with(&s, 1);
    let bob = staker_with(&s, unit);

    // One base unit alone for a second drives the accumulator to its peak.
    at(&s, START);
    s.pool.deposit(&dust, &1);
    at(&s, START + 1);
    s.pool.deposit(&bob, &unit);
    assert_eq!(s.pool.staker_info(&bob).amount, unit);

    at(&s, END);
    let bob_reward = s.pool.check_rewards(&bob);
    let dust_reward = s.pool.check_rewards(&dust);
    assert!(bob_reward > 28 * unit && bob_reward <= 29 * unit);
    assert!(dust_reward >= unit);
    assert!(bob_reward + dust_reward <= 30 * unit);

    s.pool.withdraw(&bob, &unit);
    assert_eq!(balance(&s, &bob), unit + bob_reward);
}
