//! Randomized property tests for the reserve engine.
//!
//! Each test draws from a seeded `StdRng`, so failures are reproducible.

use std::sync::Arc;

use lendswap_gates::{
    BalanceLedger, Clock, EmergencyGate, Gates, InMemoryLedger, ManualClock, OpenGate,
};
use lendswap_reserve::ReserveEngine;
use lendswap_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn open_market(admin: AccountId) -> (ReserveEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let gates = Gates::new(
        Arc::new(OpenGate),
        Arc::new(EmergencyGate::new(admin)),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    let engine = ReserveEngine::new(admin, ReserveConfig::default(), gates).unwrap();
    (engine, clock)
}

#[test]
fn borrow_succeeds_iff_within_collateral_factor() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    for _ in 0..500 {
        let admin = AccountId::new();
        let (mut engine, _) = open_market(admin);
        let x = AssetId::from("X");
        let cf: u16 = rng.gen_range(0..=9000);
        engine.add_reserve(admin, x.clone(), cf).unwrap();

        let supplied: Amount = rng.gen_range(1..=10_000);
        let borrow: Amount = rng.gen_range(1..=12_000);
        let user = AccountId::new();
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&x, &user, supplied).unwrap();
        engine.supply(&mut ledger, user, &x, supplied).unwrap();

        let capacity = supplied * Amount::from(cf) / 10_000;
        let result = engine.borrow(&mut ledger, user, &x, borrow);
        if borrow <= capacity {
            assert!(result.is_ok(), "s={supplied} cf={cf} b={borrow}: {result:?}");
            assert_eq!(engine.position(&user, &x).borrowed, borrow);
        } else {
            assert!(
                matches!(result, Err(LendswapError::InsufficientCollateral { .. })),
                "s={supplied} cf={cf} b={borrow}: {result:?}"
            );
            assert_eq!(engine.position(&user, &x).borrowed, 0);
        }
    }
}

#[test]
fn collateral_sums_across_assets() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    for _ in 0..300 {
        let admin = AccountId::new();
        let (mut engine, _) = open_market(admin);
        let x = AssetId::from("X");
        let y = AssetId::from("Y");
        let cf_x: u16 = rng.gen_range(0..=9000);
        let cf_y: u16 = rng.gen_range(0..=9000);
        engine.add_reserve(admin, x.clone(), cf_x).unwrap();
        engine.add_reserve(admin, y.clone(), cf_y).unwrap();

        let sx: Amount = rng.gen_range(1..=5_000);
        let sy: Amount = rng.gen_range(1..=5_000);
        let user = AccountId::new();
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&x, &user, sx).unwrap();
        ledger.mint(&y, &user, sy).unwrap();
        engine.supply(&mut ledger, user, &x, sx).unwrap();
        engine.supply(&mut ledger, user, &y, sy).unwrap();

        // Each term floored on its own.
        let capacity = sx * Amount::from(cf_x) / 10_000 + sy * Amount::from(cf_y) / 10_000;
        // Borrow in X, which custody can pay up to sx.
        let borrow: Amount = rng.gen_range(1..=sx);
        let result = engine.borrow(&mut ledger, user, &x, borrow);
        if borrow <= capacity {
            assert!(result.is_ok(), "capacity={capacity} b={borrow}: {result:?}");
        } else {
            assert!(matches!(
                result,
                Err(LendswapError::InsufficientCollateral { .. })
            ));
        }
    }
}

#[test]
fn liquidation_allowed_iff_below_threshold() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);
    for _ in 0..500 {
        let admin = AccountId::new();
        let (mut engine, _) = open_market(admin);
        let x = AssetId::from("X");
        engine.add_reserve(admin, x.clone(), 9000).unwrap();

        let supplied: Amount = rng.gen_range(10..=10_000);
        let borrow: Amount = rng.gen_range(1..=supplied * 9 / 10);
        let borrower = AccountId::new();
        let liquidator = AccountId::new();
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&x, &borrower, supplied).unwrap();
        ledger.mint(&x, &liquidator, 1).unwrap();
        engine.supply(&mut ledger, borrower, &x, supplied).unwrap();
        engine.borrow(&mut ledger, borrower, &x, borrow).unwrap();

        let unhealthy = supplied * 8000 / 10_000 < borrow;
        assert_eq!(engine.is_liquidatable(&borrower).unwrap(), unhealthy);
        let result = engine.liquidate(&mut ledger, liquidator, borrower, &x, &x, 1);
        if unhealthy {
            assert!(result.is_ok(), "s={supplied} b={borrow}: {result:?}");
        } else {
            assert!(matches!(result, Err(LendswapError::BorrowerHealthy(_))));
        }
    }
}

#[test]
fn random_activity_keeps_totals_consistent() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0004);
    let admin = AccountId::new();
    let (mut engine, clock) = open_market(admin);
    let assets = [AssetId::from("X"), AssetId::from("Y"), AssetId::from("Z")];
    // Factors at or below the liquidation threshold keep every borrower
    // healthy without price moves.
    for asset in &assets {
        engine
            .add_reserve(admin, asset.clone(), rng.gen_range(5000..=8000))
            .unwrap();
    }
    let users: Vec<AccountId> = (0..5).map(|_| AccountId::new()).collect();
    let mut ledger = InMemoryLedger::new();
    for user in &users {
        for asset in &assets {
            ledger.mint(asset, user, 100_000).unwrap();
        }
    }

    for _ in 0..2_000 {
        let user = users[rng.gen_range(0..users.len())];
        let asset = &assets[rng.gen_range(0..assets.len())];
        let amount: Amount = rng.gen_range(1..=5_000);
        clock.advance(rng.gen_range(0..=600));
        // Rejections are expected; consistency must hold either way.
        let _ = match rng.gen_range(0..4) {
            0 => engine.supply(&mut ledger, user, asset, amount),
            1 => engine.borrow(&mut ledger, user, asset, amount),
            2 => engine.repay(&mut ledger, user, asset, amount),
            _ => engine.withdraw(&mut ledger, user, asset, amount),
        };
    }

    for asset in &assets {
        let reserve = engine.reserve(asset).unwrap();
        let supplied: Amount = users.iter().map(|u| engine.position(u, asset).supplied).sum();
        let borrowed: Amount = users.iter().map(|u| engine.position(u, asset).borrowed).sum();
        assert_eq!(reserve.total_supplied, supplied);
        assert_eq!(reserve.total_borrowed, borrowed);
        // Custody holds exactly what was supplied and not lent out.
        assert_eq!(
            ledger.balance_of(&engine.custody(), asset) + borrowed,
            supplied
        );
    }
    for user in &users {
        assert!(engine.account_snapshot(user).unwrap().is_healthy());
    }
    ledger.verify_all().unwrap();
}
