//! Collateral valuation and account health.
//!
//! Values are unit-additive sums over an account's positions. Each per-asset
//! term is floored on its own before summing.

use std::collections::BTreeMap;

use lendswap_types::amount::{self, Amount};
use lendswap_types::{AccountRecord, AssetId, ReserveState, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// `Σ floor(supplied[a] * collateral_factor[a] / 10_000)`.
///
/// Positions in assets absent from `reserves` contribute nothing.
pub fn collateral_value(
    record: &AccountRecord,
    reserves: &BTreeMap<AssetId, ReserveState>,
) -> Result<Amount> {
    record.positions.iter().try_fold(0, |acc, (asset, position)| {
        let factor = reserves
            .get(asset)
            .map_or(0, |r| u32::from(r.collateral_factor_bps));
        amount::add(acc, amount::apply_bps(position.supplied, factor)?)
    })
}

/// `Σ floor(supplied[a] * threshold_bps / 10_000)`.
pub fn threshold_value(record: &AccountRecord, threshold_bps: u32) -> Result<Amount> {
    record.positions.values().try_fold(0, |acc, position| {
        amount::add(acc, amount::apply_bps(position.supplied, threshold_bps)?)
    })
}

/// `Σ borrowed[a]`.
pub fn borrow_value(record: &AccountRecord) -> Result<Amount> {
    record
        .positions
        .values()
        .try_fold(0, |acc, position| amount::add(acc, position.borrowed))
}

/// Point-in-time valuation of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Borrowing capacity granted by collateral factors.
    pub collateral_value: Amount,
    /// Supplied value weighted by the liquidation threshold.
    pub threshold_value: Amount,
    /// Total outstanding debt.
    pub borrow_value: Amount,
}

impl AccountSnapshot {
    pub fn compute(
        record: &AccountRecord,
        reserves: &BTreeMap<AssetId, ReserveState>,
        threshold_bps: u32,
    ) -> Result<Self> {
        Ok(Self {
            collateral_value: collateral_value(record, reserves)?,
            threshold_value: threshold_value(record, threshold_bps)?,
            borrow_value: borrow_value(record)?,
        })
    }

    /// Capacity left before a borrow is refused.
    #[must_use]
    pub fn borrowing_power(&self) -> Amount {
        self.collateral_value.saturating_sub(self.borrow_value)
    }

    /// Whether `extra` more debt stays within the collateral value.
    #[must_use]
    pub fn can_borrow(&self, extra: Amount) -> bool {
        self.borrow_value
            .checked_add(extra)
            .is_some_and(|needed| self.collateral_value >= needed)
    }

    /// `threshold_value >= borrow_value`. An account without debt is
    /// always healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.threshold_value >= self.borrow_value
    }

    /// `threshold_value / borrow_value`; `None` without debt.
    ///
    /// Values beyond `Decimal`'s range saturate to `Decimal::MAX`.
    #[must_use]
    pub fn health_factor(&self) -> Option<Decimal> {
        if self.borrow_value == 0 {
            return None;
        }
        let threshold = Decimal::from_u128(self.threshold_value).unwrap_or(Decimal::MAX);
        let borrowed = Decimal::from_u128(self.borrow_value).unwrap_or(Decimal::MAX);
        Some(threshold.checked_div(borrowed).unwrap_or(Decimal::MAX))
    }
}
