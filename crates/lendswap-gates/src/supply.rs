//! Supply conservation invariant checker.
//!
//! Mathematical invariant enforced by the ledger:
//! ```text
//! ∀ asset: Σ balances == Σ(minted) - Σ(burned)
//! ```
//!
//! Transfers (including every engine pull and pay-out) only move balances
//! between accounts, so they must never change an asset's total.

use std::collections::{HashMap, HashSet};

use lendswap_types::{Amount, AssetId, LendswapError, Result};

/// Tracks per-asset mint/burn totals and validates conservation.
#[derive(Debug, Clone)]
pub struct SupplyConservation {
    /// Total minted per asset since genesis.
    minted: HashMap<AssetId, Amount>,
    /// Total burned per asset since genesis.
    burned: HashMap<AssetId, Amount>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            minted: HashMap::new(),
            burned: HashMap::new(),
        }
    }

    pub fn record_mint(&mut self, asset: &AssetId, amount: Amount) {
        let total = self.minted.entry(asset.clone()).or_insert(0);
        *total = total.saturating_add(amount);
    }

    pub fn record_burn(&mut self, asset: &AssetId, amount: Amount) {
        let total = self.burned.entry(asset.clone()).or_insert(0);
        *total = total.saturating_add(amount);
    }

    /// Expected total supply for an asset: minted - burned.
    #[must_use]
    pub fn expected_supply(&self, asset: &AssetId) -> Amount {
        self.total_minted(asset)
            .saturating_sub(self.total_burned(asset))
    }

    /// Verify that the actual supply (sum of all balances) matches the
    /// expected supply for `asset`.
    ///
    /// # Errors
    /// Returns [`LendswapError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, asset: &AssetId, actual_supply: Amount) -> Result<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(LendswapError::SupplyInvariantViolation {
                reason: format!(
                    "Asset {asset}: actual supply {actual_supply} != expected {expected} \
                     (minted={}, burned={})",
                    self.total_minted(asset),
                    self.total_burned(asset),
                ),
            });
        }
        Ok(())
    }

    /// Every asset that has ever been minted or burned.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<AssetId> {
        let mut assets: HashSet<AssetId> = self.minted.keys().cloned().collect();
        assets.extend(self.burned.keys().cloned());
        let mut assets: Vec<AssetId> = assets.into_iter().collect();
        assets.sort();
        assets
    }

    #[must_use]
    pub fn total_minted(&self, asset: &AssetId) -> Amount {
        self.minted.get(asset).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_burned(&self, asset: &AssetId) -> Amount {
        self.burned.get(asset).copied().unwrap_or(0)
    }
}

impl Default for SupplyConservation {
    fn default() -> Self {
        Self::new()
    }
}
