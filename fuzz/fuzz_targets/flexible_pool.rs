#![no_main]

use arbitrary::Arbitrary;
use flexible_pool::{FlexiblePool, FlexiblePoolClient};
use libfuzzer_sys::fuzz_target;
use registry::{StakingRegistry, StakingRegistryClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, BytesN, Env,
};

const START: u64 = 1_000;
const END: u64 = 2_000;
const BUDGET: i128 = 1_000_000;
const WALLET: i128 = 1_000_000_000;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { staker: u8, amount: u32 },
    Withdraw { staker: u8, amount: u32 },
    Claim { staker: u8 },
    Wait { seconds: u16 },
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

    let pool_id = env.register(FlexiblePool, ());
    let pool = FlexiblePoolClient::new(&env, &pool_id);
    let _ = pool.try_initialize(
        &Address::generate(&env),
        &registry,
        &token,
        &Address::generate(&env),
        &1_000i128,
        &START,
        &END,
    );

    let sac = StellarAssetClient::new(&env, &token);
    sac.mint(&pool_id, &BUDGET);
    let mut stakers = Vec::new();
    for _ in 0..4 {
        let staker = Address::generate(&env);
        sac.mint(&staker, &WALLET);
        stakers.push(staker);
    }
    let balances = TokenClient::new(&env, &token);

    for action in actions {
        match action {
            FuzzAction::Deposit { staker, amount } => {
                let who = &stakers[staker as usize % stakers.len()];
                let _ = pool.try_deposit(who, &(amount as i128));
            }
            FuzzAction::Withdraw { staker, amount } => {
                let who = &stakers[staker as usize % stakers.len()];
                let _ = pool.try_withdraw(who, &(amount as i128));
            }
            FuzzAction::Claim { staker } => {
                let who = &stakers[staker as usize % stakers.len()];
                let _ = pool.try_claim_rewards(who);
            }
            FuzzAction::Wait { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + seconds as u64);
            }
        }

        let staked: i128 = stakers.iter().map(|s| pool.staker_info(s).amount).sum();
        let summary = pool.get_summary();
        assert_eq!(summary.amount_of_tokens_staked, staked);
        assert!(balances.balance(&pool_id) >= staked);
    }
});
