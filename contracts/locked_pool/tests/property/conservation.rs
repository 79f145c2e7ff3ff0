//! Property-based tests for locked-pool token conservation.
//!
//! Invariants tested, after every step of a random operation sequence:
//! - pool balance == live principal + Σ (rewards_pool - rewards_withdrawn)
//! - `rewards_withdrawn <= rewards_pool` for every plan
//! - `available + live principal <= max_tokens_be_staked` for every plan

use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, BytesN, Env, Vec};

use common::PlanConfig;
use locked_pool::{LockedPool, LockedPoolClient};
use registry::{StakingRegistry, StakingRegistryClient};

const START: u64 = 5_000;
const END: u64 = 5_300;
const STAKERS: usize = 3;
const PLANS: u32 = 2;

// ── Helpers ───────────────────────────────────────────────────────────────────

struct World {
    env: Env,
    pool: LockedPoolClient<'static>,
    token: TokenClient<'static>,
    owner: Address,
    stakers: [Address; STAKERS],
}

fn setup(rewards: (i128, i128)) -> World {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START - 10);

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

    let mut plans = Vec::new(&env);
    plans.push_back(PlanConfig {
        duration: 60,
        max_tokens_be_staked: 3_000,
        rewards_pool: rewards.0,
        fees_pool: 0,
        max_staking_amount: 1_500,
    });
    plans.push_back(PlanConfig {
        duration: 200,
        max_tokens_be_staked: 1_000,
        rewards_pool: rewards.1,
        fees_pool: 0,
        max_staking_amount: 1_000,
    });

    let pool_id = env.register(LockedPool, ());
    let pool = LockedPoolClient::new(&env, &pool_id);
    let owner = Address::generate(&env);
    pool.initialize(
        &Address::generate(&env),
        &registry,
        &token_id,
        &owner,
        &plans,
        &START,
        &END,
        &0,
    );
    sac.mint(&pool_id, &(rewards.0 + rewards.1));

    let stakers = [
        Address::generate(&env),
        Address::generate(&env),
        Address::generate(&env),
    ];
    for s in stakers.iter() {
        sac.mint(s, &10_000);
    }

    let token = TokenClient::new(&env, &token_id);
    World {
        env,
        pool,
        token,
        owner,
        stakers,
    }
}

#[derive(Clone, Debug)]
enum Op {
    Stake(usize, i128, u32),
    Unstake(usize, u32),
    Penalty(usize, u32),
    Rescue,
    Wait(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..STAKERS, 1i128..=1_600, 0..PLANS).prop_map(|(i, a, p)| Op::Stake(i, a, p)),
        (0..STAKERS, 0..PLANS).prop_map(|(i, p)| Op::Unstake(i, p)),
        (0..STAKERS, 0..PLANS).prop_map(|(i, p)| Op::Penalty(i, p)),
        Just(Op::Rescue),
        (1u64..=90).prop_map(Op::Wait),
    ]
}

fn apply(w: &World, op: &Op) {
    match *op {
        Op::Stake(i, amount, plan) => {
            let _ = w.pool.try_stake(&w.stakers[i], &amount, &plan);
        }
        Op::Unstake(i, plan) => {
            let _ = w.pool.try_unstake(&w.stakers[i], &plan);
        }
        Op::Penalty(i, plan) => {
            let _ = w.pool.try_unstake_with_penalty(&w.stakers[i], &plan);
        }
        Op::Rescue => {
            let _ = w.pool.try_claim_unused_rewards(&w.owner);
        }
        Op::Wait(dt) => {
            let now = w.env.ledger().timestamp();
            w.env.ledger().set_timestamp(now + dt);
        }
    }
}

fn live_principal(w: &World, plan: u32) -> i128 {
    w.stakers
        .iter()
        .map(|s| w.pool.stake_info_of(s, &plan).amount)
        .sum()
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_pool_balance_is_fully_accounted(
        rewards in (0i128..=500, 0i128..=500),
        ops in proptest::collection::vec(op_strategy(), 1..50),
    ) {
        let w = setup(rewards);

        for op in ops.iter() {
            apply(&w, op);

            let mut expected = 0i128;
            for p in 0..PLANS {
                let plan = w.pool.get_plan(&p);
                let live = live_principal(&w, p);

                prop_assert!(plan.rewards_withdrawn <= plan.rewards_pool);
                prop_assert!(plan.available_tokens_be_staked + live <= plan.max_tokens_be_staked);

                expected += live + plan.rewards_pool - plan.rewards_withdrawn;
            }
            prop_assert_eq!(w.token.balance(&w.pool.address), expected);
        }
    }

    /// Rescue succeeds at most once whatever happens around it.
    #[test]
    fn prop_rescue_is_idempotent(
        rewards in (1i128..=500, 1i128..=500),
        ops in proptest::collection::vec(op_strategy(), 1..30),
    ) {
        let w = setup(rewards);
        let mut rescues = 0u32;

        for op in ops.iter() {
            if matches!(op, Op::Rescue) {
                if w.pool.try_claim_unused_rewards(&w.owner).is_ok() {
                    rescues += 1;
                }
            } else {
                apply(&w, op);
            }
        }
        w.env.ledger().set_timestamp(END + 1);
        if w.pool.try_claim_unused_rewards(&w.owner).is_ok() {
            rescues += 1;
        }

        prop_assert!(rescues <= 1);
    }
}
