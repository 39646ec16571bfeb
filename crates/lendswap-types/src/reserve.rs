//! Lending reserve and account position types.
//!
//! One [`ReserveState`] exists per supported asset. Its counters are
//! informational: they drive rate computation and reporting but are never
//! used to cap borrowing (borrows draw on the ledger's pooled balance).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Amount, AssetId, amount, constants::BPS_SCALE};

/// Per-asset reserve accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveState {
    pub asset: AssetId,
    /// Sum of all supplied positions.
    pub total_supplied: Amount,
    /// Sum of all borrowed positions.
    pub total_borrowed: Amount,
    /// Current supply rate (bps, annualized).
    pub supply_rate_bps: u32,
    /// Current borrow rate (bps, annualized).
    pub borrow_rate_bps: u32,
    /// Seconds timestamp of the last rate recomputation.
    pub last_update_timestamp: u64,
    /// Inactive reserves reject new supply and borrows.
    pub active: bool,
    /// Borrowing power granted per unit supplied (bps, ≤ 9000).
    pub collateral_factor_bps: u16,
}

impl ReserveState {
    /// A fresh reserve: zeroed counters, seed rates, active.
    #[must_use]
    pub fn new(
        asset: AssetId,
        collateral_factor_bps: u16,
        supply_rate_bps: u32,
        borrow_rate_bps: u32,
        now: u64,
    ) -> Self {
        Self {
            asset,
            total_supplied: 0,
            total_borrowed: 0,
            supply_rate_bps,
            borrow_rate_bps,
            last_update_timestamp: now,
            active: true,
            collateral_factor_bps,
        }
    }

    /// `total_borrowed / total_supplied` in bps; zero when nothing is supplied.
    ///
    /// Not capped at 100%: borrowed may exceed supplied bookkeeping.
    #[must_use]
    pub fn utilization_bps(&self) -> Amount {
        if self.total_supplied == 0 {
            return 0;
        }
        amount::mul_div(self.total_borrowed, Amount::from(BPS_SCALE), self.total_supplied)
            .unwrap_or(Amount::MAX)
    }

    /// Supply rate as a fraction (e.g. `0.02` for 200 bps).
    #[must_use]
    pub fn supply_apr(&self) -> Decimal {
        bps_to_decimal(self.supply_rate_bps)
    }

    /// Borrow rate as a fraction (e.g. `0.04` for 400 bps).
    #[must_use]
    pub fn borrow_apr(&self) -> Decimal {
        bps_to_decimal(self.borrow_rate_bps)
    }
}

fn bps_to_decimal(bps: u32) -> Decimal {
    Decimal::new(i64::from(bps), 4)
}

/// One account's position in one asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosition {
    pub supplied: Amount,
    pub borrowed: Amount,
}

impl AccountPosition {
    /// An all-zero position is indistinguishable from "never existed".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.supplied == 0 && self.borrowed == 0
    }
}

/// All positions held by one account, keyed by asset.
///
/// Positions are created implicitly and zeroed, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub positions: BTreeMap<AssetId, AccountPosition>,
}

impl AccountRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in `asset`, zero if never touched.
    #[must_use]
    pub fn position(&self, asset: &AssetId) -> AccountPosition {
        self.positions.get(asset).copied().unwrap_or_default()
    }

    /// Mutable position in `asset`, created on first touch.
    pub fn position_mut(&mut self, asset: &AssetId) -> &mut AccountPosition {
        self.positions.entry(asset.clone()).or_default()
    }

    /// Whether every position is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.values().all(AccountPosition::is_zero)
    }
}
