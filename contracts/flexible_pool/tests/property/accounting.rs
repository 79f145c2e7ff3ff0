//! Property-based tests for the flexible pool's accounting.
//!
//! Invariants tested, after every step of a random operation sequence:
//! - `amount_of_tokens_staked` equals the sum of every staker's amount
//! - the pool never holds less than the staked principal
//! - `acc_reward_per_share` never decreases
//! - rewards paid plus rewards still owed never exceed what was emitted

use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, BytesN, Env};

use flexible_pool::{FlexiblePool, FlexiblePoolClient};
use registry::{StakingRegistry, StakingRegistryClient};

const START: u64 = 10_000;
const END: u64 = 10_600;
const STAKERS: usize = 3;
const WALLET: i128 = 1_000_000;

// ── Helpers ───────────────────────────────────────────────────────────────────

struct World {
    env: Env,
    pool: FlexiblePoolClient<'static>,
    token: TokenClient<'static>,
    stakers: [Address; STAKERS],
}

fn setup(rate: i128, budget: i128) -> World {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let token_id = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let sac = StellarAssetClient::new(&env, &token_id);

    let registry = env.register(StakingRegistry, ());
    StakingRegistryClient::new(&env, &registry).initialize(
        &Address::generate(&env),
        &Address::generate(&env),
        &BytesN::from_array(&env, &[0u8; 32]),
    );

    let pool_id = env.register(FlexiblePool, ());
    let pool = FlexiblePoolClient::new(&env, &pool_id);
    pool.initialize(
        &Address::generate(&env),
        &registry,
        &token_id,
        &Address::generate(&env),
        &rate,
        &START,
        &END,
    );
    sac.mint(&pool_id, &budget);

    let stakers = [
        Address::generate(&env),
        Address::generate(&env),
        Address::generate(&env),
    ];
    for s in stakers.iter() {
        sac.mint(s, &WALLET);
    }

    let token = TokenClient::new(&env, &token_id);
    World {
        env,
        pool,
        token,
        stakers,
    }
}

#[derive(Clone, Debug)]
enum Op {
    Deposit(usize, i128),
    Withdraw(usize, i128),
    Claim(usize),
    Wait(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..STAKERS, 1i128..=5_000).prop_map(|(i, a)| Op::Deposit(i, a)),
        (0..STAKERS, 0i128..=5_000).prop_map(|(i, a)| Op::Withdraw(i, a)),
        (0..STAKERS).prop_map(Op::Claim),
        (1u64..=60).prop_map(Op::Wait),
    ]
}

/// Apply one operation; rejected operations roll back and are ignored.
fn apply(w: &World, op: &Op) {
    match *op {
        Op::Deposit(i, amount) => {
            let _ = w.pool.try_deposit(&w.stakers[i], &amount);
        }
        Op::Withdraw(i, amount) => {
            let _ = w.pool.try_withdraw(&w.stakers[i], &amount);
        }
        Op::Claim(i) => {
            let _ = w.pool.try_claim_rewards(&w.stakers[i]);
        }
        Op::Wait(dt) => {
            let now = w.env.ledger().timestamp();
            w.env.ledger().set_timestamp(now + dt);
        }
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Staked totals always match the per-staker positions and are fully
    /// backed by tokens held by the pool.
    #[test]
    fn prop_staked_total_is_conserved(
        rate in 1i128..=50,
        budget in 0i128..=40_000,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let w = setup(rate, budget);

        for op in ops.iter() {
            apply(&w, op);

            let sum: i128 = w
                .stakers
                .iter()
                .map(|s| w.pool.staker_info(s).amount)
                .sum();
            let total = w.pool.get_summary().amount_of_tokens_staked;
            prop_assert_eq!(total, sum);
            prop_assert!(w.token.balance(&w.pool.address) >= total);
        }
    }

    /// The reward-per-share accumulator is monotone non-decreasing.
    #[test]
    fn prop_accumulator_is_monotonic(
        rate in 1i128..=50,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let w = setup(rate, 1_000_000);
        let mut last = w.pool.get_summary().acc_reward_per_share;

        for op in ops.iter() {
            apply(&w, op);
            let acc = w.pool.get_summary().acc_reward_per_share;
            prop_assert!(acc >= last);
            last = acc;
        }
    }

    /// Paid plus owed rewards stay within the emission so far, up to one unit
    /// of rounding per settlement.
    #[test]
    fn prop_rewards_never_exceed_emission(
        rate in 1i128..=50,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let w = setup(rate, 1_000_000);

        for op in ops.iter() {
            apply(&w, op);
        }

        let mut paid = 0i128;
        let mut owed = 0i128;
        for s in w.stakers.iter() {
            let principal = w.pool.staker_info(s).amount;
            paid += w.token.balance(s) + principal - WALLET;
            owed += w.pool.check_rewards(s);
        }

        let now = w.env.ledger().timestamp().min(END);
        let emitted = rate * (now - START) as i128;
        let slack = ops.len() as i128 + STAKERS as i128;
        prop_assert!(paid + owed <= emitted + slack);
    }
}
