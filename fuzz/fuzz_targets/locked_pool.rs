#![no_main]

use arbitrary::Arbitrary;
use common::PlanConfig;
use libfuzzer_sys::fuzz_target;
use locked_pool::{LockedPool, LockedPoolClient};
use registry::{StakingRegistry, StakingRegistryClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    vec, Address, BytesN, Env,
};

const START: u64 = 1_000;
const END: u64 = 1_100;
const WALLET: i128 = 1_000_000;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { staker: u8, plan: u8, amount: u32 },
    Unstake { staker: u8, plan: u8 },
    UnstakeWithPenalty { staker: u8, plan: u8 },
    ClaimUnused,
    Wait { seconds: u8 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let registry = env.register(StakingRegistry, ());
    let _ = StakingRegistryClient::new(&env, &registry).try_initialize(
        &Address::generate(&env),
        &Address::generate(&env),
        &BytesN::from_array(&env, &[0u8; 32]),
    );

    let plans = vec![
        &env,
        PlanConfig {
            duration: 20,
            max_tokens_be_staked: 10_000,
            rewards_pool: 1_000,
            fees_pool: 0,
            max_staking_amount: 5_000,
        },
        PlanConfig {
            duration: 150,
            max_tokens_be_staked: 7_000,
            rewards_pool: 333,
            fees_pool: 0,
            max_staking_amount: 7_000,
        },
    ];
    let owner = Address::generate(&env);
    let pool_id = env.register(LockedPool, ());
    let pool = LockedPoolClient::new(&env, &pool_id);
    let _ = pool.try_initialize(
        &Address::generate(&env),
        &registry,
        &token,
        &owner,
        &plans,
        &START,
        &END,
        &0i128,
    );

    let sac = StellarAssetClient::new(&env, &token);
    sac.mint(&pool_id, &1_333);
    let mut stakers = Vec::new();
    for _ in 0..3 {
        let staker = Address::generate(&env);
        sac.mint(&staker, &WALLET);
        stakers.push(staker);
    }
    let balances = TokenClient::new(&env, &token);

    for action in actions {
        match action {
            FuzzAction::Stake { staker, plan, amount } => {
                let who = &stakers[staker as usize % stakers.len()];
                let _ = pool.try_stake(who, &(amount as i128), &((plan % 3) as u32));
            }
            FuzzAction::Unstake { staker, plan } => {
                let who = &stakers[staker as usize % stakers.len()];
                let _ = pool.try_unstake(who, &((plan % 3) as u32));
            }
            FuzzAction::UnstakeWithPenalty { staker, plan } => {
                let who = &stakers[staker as usize % stakers.len()];
                let _ = pool.try_unstake_with_penalty(who, &((plan % 3) as u32));
            }
            FuzzAction::ClaimUnused => {
                let _ = pool.try_claim_unused_rewards(&owner);
            }
            FuzzAction::Wait { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + seconds as u64);
            }
        }

        let mut live = 0i128;
        for (index, plan) in pool.get_plans().iter().enumerate() {
            let staked: i128 = stakers
                .iter()
                .map(|s| pool.stake_info_of(s, &(index as u32)).amount)
                .sum();
            assert!(plan.rewards_withdrawn <= plan.rewards_pool);
            assert!(plan.available_tokens_be_staked + staked <= plan.max_tokens_be_staked);
            live += staked + plan.rewards_pool - plan.rewards_withdrawn;
        }
        assert_eq!(balances.balance(&pool_id), live);
    }
});
