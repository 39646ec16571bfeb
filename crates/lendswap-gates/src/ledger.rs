//! Balance ledger: the fungible-balance primitive both engines settle on.
//!
//! The engines only consume the [`BalanceLedger`] trait. [`InMemoryLedger`]
//! is the reference implementation: per-(account, asset) balances with mint
//! and burn totals checked by [`SupplyConservation`]. All mutations are
//! atomic: either the full operation succeeds or every balance is unchanged.

use std::collections::HashMap;

use lendswap_types::{AccountId, Amount, AssetId, LendswapError, Result, amount};

use crate::supply::SupplyConservation;

/// Fungible balances per account per asset.
///
/// Any error aborts the calling engine operation as a whole.
pub trait BalanceLedger {
    /// Move `amount` of `asset` from `from` to `to`.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()>;

    /// Create `amount` of `asset` in `to`'s balance.
    fn mint(&mut self, asset: &AssetId, to: &AccountId, amount: Amount) -> Result<()>;

    /// Destroy `amount` of `asset` from `from`'s balance.
    fn burn(&mut self, asset: &AssetId, from: &AccountId, amount: Amount) -> Result<()>;

    /// Current balance; zero for unknown (account, asset) pairs.
    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Amount;
}

/// In-memory ledger with supply conservation tracking.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    /// Per-(account, asset) balances.
    balances: HashMap<(AccountId, AssetId), Amount>,
    /// Mint/burn totals per asset.
    supply: SupplyConservation,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            supply: SupplyConservation::new(),
        }
    }

    fn debit_check(&self, account: &AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        let available = self.balance_of(account, asset);
        if available < amount {
            return Err(LendswapError::InsufficientBalance {
                asset: asset.clone(),
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Total supply of an asset (sum over all accounts).
    #[must_use]
    pub fn total_supply(&self, asset: &AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, balance)| *balance)
            .sum()
    }

    /// Verify supply conservation for one asset.
    pub fn verify_supply(&self, asset: &AssetId) -> Result<()> {
        self.supply.verify(asset, self.total_supply(asset))
    }

    /// Verify supply conservation for every asset ever minted or burned.
    pub fn verify_all(&self) -> Result<()> {
        self.supply
            .tracked_assets()
            .iter()
            .try_for_each(|asset| self.verify_supply(asset))
    }

    /// Access the supply tracker.
    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceLedger for InMemoryLedger {
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        self.debit_check(from, asset, amount)?;
        if from == to || amount == 0 {
            return Ok(());
        }
        // Credit side is checked before anything moves.
        let credited = amount::add(self.balance_of(to, asset), amount)?;

        let source = self
            .balances
            .get_mut(&(*from, asset.clone()))
            .ok_or(LendswapError::ArithmeticOverflow)?;
        *source -= amount;
        self.balances.insert((*to, asset.clone()), credited);

        tracing::trace!(
            from = %from.short(),
            to = %to.short(),
            asset = %asset,
            amount = %amount,
            "Ledger transfer"
        );
        Ok(())
    }

    fn mint(&mut self, asset: &AssetId, to: &AccountId, amount: Amount) -> Result<()> {
        let credited = amount::add(self.balance_of(to, asset), amount)?;
        amount::add(self.supply.expected_supply(asset), amount)?;
        self.balances.insert((*to, asset.clone()), credited);
        self.supply.record_mint(asset, amount);
        Ok(())
    }

    fn burn(&mut self, asset: &AssetId, from: &AccountId, amount: Amount) -> Result<()> {
        self.debit_check(from, asset, amount)?;
        if let Some(balance) = self.balances.get_mut(&(*from, asset.clone())) {
            *balance -= amount;
        }
        self.supply.record_burn(asset, amount);
        Ok(())
    }

    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.balances
            .get(&(*account, asset.clone()))
            .copied()
            .unwrap_or(0)
    }
}
