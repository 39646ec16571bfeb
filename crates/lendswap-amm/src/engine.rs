//! Pool engine: lifecycle, liquidity and swaps over the balance ledger.
//!
//! Mutating calls take the execution guard, pass the shared gates, price
//! the operation with [`crate::math`], pull inbound tokens, commit, and pay
//! out last. A failed pay-out restores the pool record and returns whatever
//! was pulled, so a rejected call leaves pools, shares, the journal and
//! ledger balances exactly as they were.

use std::collections::BTreeMap;
use std::sync::Arc;

use lendswap_gates::{BalanceLedger, EventJournal, ExecutionGuard, Gates};
use lendswap_types::amount::{self, Amount};
use lendswap_types::{
    AccountId, AmmConfig, AssetId, Event, EventKind, LendswapError, Pool, PoolId, Result,
};

use crate::math;

const CUSTODY_LABEL: &str = "lendswap:amm:custody";

/// Pool fields one call may overwrite.
#[derive(Debug, Clone, Copy)]
struct PoolSnapshot {
    reserve_a: Amount,
    reserve_b: Amount,
    total_shares: Amount,
    account: AccountId,
    shares: Option<Amount>,
}

impl PoolSnapshot {
    fn capture(pool: &Pool, account: AccountId) -> Self {
        Self {
            reserve_a: pool.reserve_a,
            reserve_b: pool.reserve_b,
            total_shares: pool.total_shares,
            account,
            shares: pool.share_balances.get(&account).copied(),
        }
    }

    fn restore(self, pool: &mut Pool) {
        pool.reserve_a = self.reserve_a;
        pool.reserve_b = self.reserve_b;
        pool.total_shares = self.total_shares;
        match self.shares {
            Some(shares) => {
                pool.share_balances.insert(self.account, shares);
            }
            None => {
                pool.share_balances.remove(&self.account);
            }
        }
    }
}

/// Constant-product AMM over any number of asset pairs.
pub struct PoolEngine {
    admin: AccountId,
    custody: AccountId,
    config: AmmConfig,
    gates: Gates,
    guard: Arc<ExecutionGuard>,
    pools: BTreeMap<PoolId, Pool>,
    journal: EventJournal,
}

impl PoolEngine {
    /// # Errors
    /// [`LendswapError::Configuration`] if `config` fails validation.
    pub fn new(admin: AccountId, config: AmmConfig, gates: Gates) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            admin,
            custody: AccountId::from_label(CUSTODY_LABEL),
            config,
            gates,
            guard: ExecutionGuard::new(),
            pools: BTreeMap::new(),
            journal: EventJournal::new(),
        })
    }

    /// Register an empty pool for the (unordered) pair.
    ///
    /// # Errors
    /// `NotOwner`, `SystemPaused`, `SamePair`, `ZeroAddressAsset`,
    /// `PoolExists`.
    pub fn create_pool(
        &mut self,
        caller: AccountId,
        asset_a: &AssetId,
        asset_b: &AssetId,
    ) -> Result<PoolId> {
        let _token = self.guard.enter()?;
        self.gates.admit_admin(&caller, &self.admin)?;

        if asset_a == asset_b {
            return Err(LendswapError::SamePair(asset_a.clone()));
        }
        if asset_a.is_zero() || asset_b.is_zero() {
            return Err(LendswapError::ZeroAddressAsset);
        }
        let pool = Pool::new(asset_a, asset_b);
        let id = pool.id;
        if self.pools.contains_key(&id) {
            return Err(LendswapError::PoolExists(id));
        }

        tracing::info!(
            pool = %id,
            asset_a = %pool.asset_a,
            asset_b = %pool.asset_b,
            "Pool created"
        );
        let kind = EventKind::PoolCreated {
            pool: id,
            asset_a: pool.asset_a.clone(),
            asset_b: pool.asset_b.clone(),
        };
        self.pools.insert(id, pool);
        self.journal.record(self.gates.now(), kind);
        Ok(id)
    }

    /// Open or close a pool to deposits and swaps.
    ///
    /// Setting the current status again is a no-op and journals nothing.
    pub fn set_pool_active(&mut self, caller: AccountId, pool_id: PoolId, active: bool) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit_admin(&caller, &self.admin)?;

        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or(LendswapError::PoolNotFound(pool_id))?;
        if pool.active == active {
            return Ok(());
        }
        pool.active = active;

        tracing::info!(pool = %pool_id, active, "Pool status changed");
        self.journal.record(
            self.gates.now(),
            EventKind::PoolStatusChanged {
                pool: pool_id,
                active,
            },
        );
        Ok(())
    }

    /// Deposit both assets and mint shares.
    ///
    /// An empty pool takes the desired amounts as-is; otherwise the deposit
    /// is fitted to the current ratio (see [`math::optimal_amounts`]).
    /// Returns `(amount_a, amount_b, liquidity)`.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `PoolNotFound`, `PoolInactive`,
    /// `InsufficientTokenA`/`B`, `InsufficientLiquidity`, or a ledger error
    /// on either pull.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        pool_id: PoolId,
        amount_a_desired: Amount,
        amount_b_desired: Amount,
        amount_a_min: Amount,
        amount_b_min: Amount,
    ) -> Result<(Amount, Amount, Amount)> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(amount_a_desired)?;
        ensure_nonzero(amount_b_desired)?;
        let pool = self.active_pool(pool_id)?;

        // 1. Price
        let (amount_a, amount_b) = if pool.is_empty() {
            (amount_a_desired, amount_b_desired)
        } else {
            math::optimal_amounts(
                pool.reserve_a,
                pool.reserve_b,
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
            )?
        };
        let liquidity = math::shares_to_mint(
            amount_a,
            amount_b,
            pool.reserve_a,
            pool.reserve_b,
            pool.total_shares,
        )?;
        if liquidity == 0 {
            tracing::warn!(
                pool = %pool_id,
                amount_a = %amount_a,
                amount_b = %amount_b,
                "Deposit rejected: mints no shares"
            );
            return Err(LendswapError::InsufficientLiquidity);
        }
        let reserve_a = amount::add(pool.reserve_a, amount_a)?;
        let reserve_b = amount::add(pool.reserve_b, amount_b)?;
        let total_shares = amount::add(pool.total_shares, liquidity)?;
        let shares = amount::add(pool.share_balance(&caller), liquidity)?;
        let (asset_a, asset_b) = (pool.asset_a.clone(), pool.asset_b.clone());

        // 2. Pull both sides
        ledger.transfer(&caller, &self.custody, &asset_a, amount_a)?;
        if let Err(err) = ledger.transfer(&caller, &self.custody, &asset_b, amount_b) {
            self.refund(ledger, &caller, &asset_a, amount_a);
            return Err(err);
        }

        // 3. Commit
        let pool = self.pool_mut(pool_id)?;
        pool.reserve_a = reserve_a;
        pool.reserve_b = reserve_b;
        pool.total_shares = total_shares;
        pool.share_balances.insert(caller, shares);

        tracing::info!(
            pool = %pool_id,
            account = %caller,
            amount_a = %amount_a,
            amount_b = %amount_b,
            liquidity = %liquidity,
            reserve_a = %reserve_a,
            reserve_b = %reserve_b,
            total_shares = %total_shares,
            "Liquidity added"
        );
        self.journal.record(
            self.gates.now(),
            EventKind::LiquidityAdded {
                pool: pool_id,
                account: caller,
                amount_a,
                amount_b,
                liquidity,
                reserve_a,
                reserve_b,
                total_shares,
            },
        );
        Ok((amount_a, amount_b, liquidity))
    }

    /// Burn `liquidity` shares for a pro-rata slice of both reserves.
    ///
    /// Allowed on inactive pools. Returns `(amount_a, amount_b)`.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `PoolNotFound`, `InsufficientShares`,
    /// `InsufficientLiquidity`, `InsufficientAmounts`, or a ledger error if
    /// custody cannot pay.
    pub fn remove_liquidity(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        pool_id: PoolId,
        liquidity: Amount,
        amount_a_min: Amount,
        amount_b_min: Amount,
    ) -> Result<(Amount, Amount)> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(liquidity)?;
        let pool = self.known_pool(pool_id)?;

        // 1. Price
        let available = pool.share_balance(&caller);
        if available < liquidity {
            return Err(LendswapError::InsufficientShares {
                needed: liquidity,
                available,
            });
        }
        let amount_a = math::pro_rata(liquidity, pool.reserve_a, pool.total_shares)?;
        let amount_b = math::pro_rata(liquidity, pool.reserve_b, pool.total_shares)?;
        if amount_a < amount_a_min || amount_b < amount_b_min {
            tracing::warn!(
                pool = %pool_id,
                account = %caller,
                amount_a = %amount_a,
                amount_b = %amount_b,
                amount_a_min = %amount_a_min,
                amount_b_min = %amount_b_min,
                "Removal rejected: below minimums"
            );
            return Err(LendswapError::InsufficientAmounts { amount_a, amount_b });
        }
        let reserve_a = amount::sub(pool.reserve_a, amount_a)?;
        let reserve_b = amount::sub(pool.reserve_b, amount_b)?;
        let total_shares = amount::sub(pool.total_shares, liquidity)?;
        let shares = amount::sub(available, liquidity)?;
        let (asset_a, asset_b) = (pool.asset_a.clone(), pool.asset_b.clone());
        self.ensure_custody_holds(ledger, &asset_a, amount_a)?;
        self.ensure_custody_holds(ledger, &asset_b, amount_b)?;

        // 2. Commit
        let pool = self.pool_mut(pool_id)?;
        let snapshot = PoolSnapshot::capture(pool, caller);
        pool.reserve_a = reserve_a;
        pool.reserve_b = reserve_b;
        pool.total_shares = total_shares;
        if shares == 0 {
            pool.share_balances.remove(&caller);
        } else {
            pool.share_balances.insert(caller, shares);
        }

        // 3. Pay out both sides
        if let Err(err) = ledger.transfer(&self.custody, &caller, &asset_a, amount_a) {
            self.restore(pool_id, snapshot, &err);
            return Err(err);
        }
        if let Err(err) = ledger.transfer(&self.custody, &caller, &asset_b, amount_b) {
            if let Err(reclaim) = ledger.transfer(&caller, &self.custody, &asset_a, amount_a) {
                tracing::error!(
                    pool = %pool_id,
                    account = %caller,
                    asset = %asset_a,
                    amount = %amount_a,
                    error = %reclaim,
                    "Reclaim of first pay-out failed"
                );
            }
            self.restore(pool_id, snapshot, &err);
            return Err(err);
        }

        tracing::info!(
            pool = %pool_id,
            account = %caller,
            amount_a = %amount_a,
            amount_b = %amount_b,
            liquidity = %liquidity,
            reserve_a = %reserve_a,
            reserve_b = %reserve_b,
            total_shares = %total_shares,
            "Liquidity removed"
        );
        self.journal.record(
            self.gates.now(),
            EventKind::LiquidityRemoved {
                pool: pool_id,
                account: caller,
                amount_a,
                amount_b,
                liquidity,
                reserve_a,
                reserve_b,
                total_shares,
            },
        );
        Ok((amount_a, amount_b))
    }

    /// Sell exactly `amount_in` of `token_in` for the pool's other asset.
    ///
    /// Returns the amount paid out.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `PoolNotFound`, `PoolInactive`,
    /// `InvalidToken`, `InsufficientLiquidity`, `InsufficientOutput`, or a
    /// ledger error on either transfer.
    pub fn swap_exact_tokens_for_tokens(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        pool_id: PoolId,
        token_in: &AssetId,
        amount_in: Amount,
        amount_out_min: Amount,
    ) -> Result<Amount> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(amount_in)?;
        let pool = self.active_pool(pool_id)?;

        // 1. Price
        let foreign = || LendswapError::InvalidToken {
            pool: pool_id,
            token: token_in.clone(),
        };
        let token_out = pool.counter_asset(token_in).cloned().ok_or_else(foreign)?;
        let (reserve_in, reserve_out) = pool.reserves_for(token_in).ok_or_else(foreign)?;
        let amount_out = math::get_amount_out(
            amount_in,
            reserve_in,
            reserve_out,
            self.config.fee_multiplier_bps(),
        )?;
        if amount_out < amount_out_min {
            tracing::warn!(
                pool = %pool_id,
                account = %caller,
                token_in = %token_in,
                amount_in = %amount_in,
                amount_out = %amount_out,
                amount_out_min = %amount_out_min,
                "Swap rejected: insufficient output"
            );
            return Err(LendswapError::InsufficientOutput {
                amount_out,
                amount_out_min,
            });
        }
        // Also covers the empty pool, which quotes zero.
        if amount_out >= reserve_out {
            return Err(LendswapError::InsufficientLiquidity);
        }
        let new_reserve_in = amount::add(reserve_in, amount_in)?;
        let new_reserve_out = amount::sub(reserve_out, amount_out)?;
        let a_is_in = *token_in == pool.asset_a;

        // 2. Pull
        ledger.transfer(&caller, &self.custody, token_in, amount_in)?;

        // 3. Commit
        let pool = self.pool_mut(pool_id)?;
        let snapshot = PoolSnapshot::capture(pool, caller);
        if a_is_in {
            pool.reserve_a = new_reserve_in;
            pool.reserve_b = new_reserve_out;
        } else {
            pool.reserve_b = new_reserve_in;
            pool.reserve_a = new_reserve_out;
        }
        let (reserve_a, reserve_b) = (pool.reserve_a, pool.reserve_b);

        // 4. Pay out
        if let Err(err) = ledger.transfer(&self.custody, &caller, &token_out, amount_out) {
            self.restore(pool_id, snapshot, &err);
            self.refund(ledger, &caller, token_in, amount_in);
            return Err(err);
        }

        tracing::info!(
            pool = %pool_id,
            account = %caller,
            token_in = %token_in,
            amount_in = %amount_in,
            amount_out = %amount_out,
            reserve_a = %reserve_a,
            reserve_b = %reserve_b,
            "Swapped"
        );
        self.journal.record(
            self.gates.now(),
            EventKind::Swapped {
                pool: pool_id,
                account: caller,
                token_in: token_in.clone(),
                amount_in,
                amount_out,
                reserve_a,
                reserve_b,
            },
        );
        Ok(amount_out)
    }

    // ── Views ──────────────────────────────────────────────────────────

    /// Quote a swap against current reserves without touching state.
    ///
    /// Zero when either reserve is empty.
    pub fn get_amount_out(
        &self,
        pool_id: PoolId,
        token_in: &AssetId,
        amount_in: Amount,
    ) -> Result<Amount> {
        let pool = self.known_pool(pool_id)?;
        let (reserve_in, reserve_out) =
            pool.reserves_for(token_in)
                .ok_or_else(|| LendswapError::InvalidToken {
                    pool: pool_id,
                    token: token_in.clone(),
                })?;
        math::get_amount_out(
            amount_in,
            reserve_in,
            reserve_out,
            self.config.fee_multiplier_bps(),
        )
    }

    /// `amount_a * reserve_b / reserve_a`.
    pub fn quote(&self, amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount> {
        math::quote(amount_a, reserve_a, reserve_b)
    }

    #[must_use]
    pub fn pool(&self, pool_id: PoolId) -> Option<&Pool> {
        self.pools.get(&pool_id)
    }

    /// Pool for the unordered pair, if created.
    #[must_use]
    pub fn pool_for(&self, a: &AssetId, b: &AssetId) -> Option<&Pool> {
        self.pools.get(&Self::pool_id_for(a, b))
    }

    /// Deterministic id for the unordered pair, whether or not it exists.
    #[must_use]
    pub fn pool_id_for(a: &AssetId, b: &AssetId) -> PoolId {
        PoolId::for_pair(a, b)
    }

    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    #[must_use]
    pub fn share_balance(&self, pool_id: PoolId, account: &AccountId) -> Amount {
        self.pools
            .get(&pool_id)
            .map_or(0, |pool| pool.share_balance(account))
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.journal.events()
    }

    #[must_use]
    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    #[must_use]
    pub fn admin(&self) -> AccountId {
        self.admin
    }

    /// Ledger account holding every pool's reserves.
    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    #[must_use]
    pub fn config(&self) -> &AmmConfig {
        &self.config
    }

    /// Shared handle to this engine's execution guard.
    #[must_use]
    pub fn guard(&self) -> Arc<ExecutionGuard> {
        Arc::clone(&self.guard)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn known_pool(&self, pool_id: PoolId) -> Result<&Pool> {
        self.pools
            .get(&pool_id)
            .ok_or(LendswapError::PoolNotFound(pool_id))
    }

    fn active_pool(&self, pool_id: PoolId) -> Result<&Pool> {
        let pool = self.known_pool(pool_id)?;
        if !pool.active {
            return Err(LendswapError::PoolInactive(pool_id));
        }
        Ok(pool)
    }

    fn pool_mut(&mut self, pool_id: PoolId) -> Result<&mut Pool> {
        self.pools
            .get_mut(&pool_id)
            .ok_or(LendswapError::PoolNotFound(pool_id))
    }

    fn ensure_custody_holds(
        &self,
        ledger: &dyn BalanceLedger,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        let available = ledger.balance_of(&self.custody, asset);
        if available < amount {
            return Err(LendswapError::InsufficientBalance {
                asset: asset.clone(),
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    fn restore(&mut self, pool_id: PoolId, snapshot: PoolSnapshot, cause: &LendswapError) {
        tracing::warn!(pool = %pool_id, error = %cause, "Pay-out failed, pool restored");
        if let Some(pool) = self.pools.get_mut(&pool_id) {
            snapshot.restore(pool);
        }
    }

    /// Return tokens pulled earlier in a call that is being abandoned.
    fn refund(
        &self,
        ledger: &mut dyn BalanceLedger,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) {
        if let Err(err) = ledger.transfer(&self.custody, to, asset, amount) {
            tracing::error!(
                to = %to,
                asset = %asset,
                amount = %amount,
                error = %err,
                "Refund of pulled tokens failed"
            );
        }
    }
}

fn ensure_nonzero(amount: Amount) -> Result<()> {
    if amount == 0 {
        return Err(LendswapError::ZeroAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use lendswap_gates::{BalanceLedger, InMemoryLedger};

    use super::*;

    fn setup() -> (PoolEngine, InMemoryLedger, AccountId, AccountId, PoolId) {
        let admin = AccountId::new();
        let mut engine = PoolEngine::new(admin, AmmConfig::default(), Gates::open(admin)).unwrap();
        let id = engine
            .create_pool(admin, &AssetId::from("B"), &AssetId::from("A"))
            .unwrap();
        let user = AccountId::new();
        let mut ledger = InMemoryLedger::new();
        ledger.mint(&AssetId::from("A"), &user, 10_000).unwrap();
        ledger.mint(&AssetId::from("B"), &user, 10_000).unwrap();
        (engine, ledger, admin, user, id)
    }

    #[test]
    fn create_pool_canonicalizes() {
        let (engine, _, _, _, id) = setup();
        let pool = engine.pool(id).unwrap();
        assert_eq!(pool.asset_a, AssetId::from("A"));
        assert_eq!(
            PoolEngine::pool_id_for(&AssetId::from("A"), &AssetId::from("B")),
            id
        );
        assert!(engine.pool_for(&AssetId::from("B"), &AssetId::from("A")).is_some());
        assert_eq!(engine.pools().count(), 1);
    }

    #[test]
    fn create_pool_rejections() {
        let (mut engine, _, admin, user, id) = setup();
        let a = AssetId::from("A");
        assert!(matches!(
            engine.create_pool(admin, &a, &a),
            Err(LendswapError::SamePair(_))
        ));
        assert!(matches!(
            engine.create_pool(admin, &a, &AssetId::from("")),
            Err(LendswapError::ZeroAddressAsset)
        ));
        assert!(matches!(
            engine.create_pool(admin, &AssetId::from("B"), &a),
            Err(LendswapError::PoolExists(existing)) if existing == id
        ));
        assert!(matches!(
            engine.create_pool(user, &a, &AssetId::from("C")),
            Err(LendswapError::NotOwner(_))
        ));
    }

    #[test]
    fn full_exit_clears_share_entry() {
        let (mut engine, mut ledger, _, user, id) = setup();
        let (_, _, liquidity) = engine
            .add_liquidity(&mut ledger, user, id, 400, 900, 0, 0)
            .unwrap();
        assert_eq!(liquidity, 600);
        engine
            .remove_liquidity(&mut ledger, user, id, liquidity, 0, 0)
            .unwrap();
        let pool = engine.pool(id).unwrap();
        assert!(pool.share_balances.is_empty());
        assert!(pool.is_empty());
        assert!(pool.emptiness_is_consistent());
        assert_eq!(ledger.balance_of(&user, &AssetId::from("A")), 10_000);
    }

    #[test]
    fn inactive_pool_allows_only_removal() {
        let (mut engine, mut ledger, admin, user, id) = setup();
        engine
            .add_liquidity(&mut ledger, user, id, 1000, 1000, 0, 0)
            .unwrap();
        engine.set_pool_active(admin, id, false).unwrap();
        assert!(matches!(
            engine.add_liquidity(&mut ledger, user, id, 1, 1, 0, 0),
            Err(LendswapError::PoolInactive(_))
        ));
        assert!(matches!(
            engine.swap_exact_tokens_for_tokens(&mut ledger, user, id, &AssetId::from("A"), 10, 0),
            Err(LendswapError::PoolInactive(_))
        ));
        engine
            .remove_liquidity(&mut ledger, user, id, 1000, 0, 0)
            .unwrap();
    }

    #[test]
    fn swap_rejects_foreign_token() {
        let (mut engine, mut ledger, _, user, id) = setup();
        engine
            .add_liquidity(&mut ledger, user, id, 1000, 1000, 0, 0)
            .unwrap();
        assert!(matches!(
            engine.swap_exact_tokens_for_tokens(&mut ledger, user, id, &AssetId::from("C"), 10, 0),
            Err(LendswapError::InvalidToken { .. })
        ));
        assert!(matches!(
            engine.get_amount_out(id, &AssetId::from("C"), 10),
            Err(LendswapError::InvalidToken { .. })
        ));
    }

    #[test]
    fn swap_on_empty_pool_lacks_liquidity() {
        let (mut engine, mut ledger, _, user, id) = setup();
        assert_eq!(engine.get_amount_out(id, &AssetId::from("A"), 100).unwrap(), 0);
        assert!(matches!(
            engine.swap_exact_tokens_for_tokens(&mut ledger, user, id, &AssetId::from("A"), 100, 0),
            Err(LendswapError::InsufficientLiquidity)
        ));
        // A minimum is checked before liquidity.
        assert_eq!(
            engine.swap_exact_tokens_for_tokens(&mut ledger, user, id, &AssetId::from("A"), 100, 1),
            Err(LendswapError::InsufficientOutput {
                amount_out: 0,
                amount_out_min: 1
            })
        );
        assert!(engine.pool(id).unwrap().is_empty());
        assert!(engine.events().iter().all(|e| e.kind.name() != "SWAPPED"));
    }

    #[test]
    fn dust_swap_with_zero_minimum_feeds_the_pool() {
        let (mut engine, mut ledger, _, user, id) = setup();
        engine
            .add_liquidity(&mut ledger, user, id, 1000, 1000, 0, 0)
            .unwrap();
        let a = AssetId::from("A");
        let before = ledger.balance_of(&user, &a);
        // 1 * 0.997 floors to zero.
        assert_eq!(
            engine.swap_exact_tokens_for_tokens(&mut ledger, user, id, &a, 1, 0),
            Ok(0)
        );
        let pool = engine.pool(id).unwrap();
        assert_eq!((pool.reserve_a, pool.reserve_b), (1001, 1000));
        assert_eq!(ledger.balance_of(&user, &a), before - 1);

        // The same dust with a minimum is refused.
        assert_eq!(
            engine.swap_exact_tokens_for_tokens(&mut ledger, user, id, &a, 1, 1),
            Err(LendswapError::InsufficientOutput {
                amount_out: 0,
                amount_out_min: 1
            })
        );
    }

    #[test]
    fn constructor_rejects_full_fee() {
        let admin = AccountId::new();
        let config = AmmConfig { swap_fee_bps: 10_000 };
        assert!(matches!(
            PoolEngine::new(admin, config, Gates::open(admin)),
            Err(LendswapError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_pool_is_reported() {
        let (mut engine, mut ledger, _, user, _) = setup();
        let missing = PoolId::for_pair(&AssetId::from("X"), &AssetId::from("Y"));
        assert!(matches!(
            engine.add_liquidity(&mut ledger, user, missing, 1, 1, 0, 0),
            Err(LendswapError::PoolNotFound(_))
        ));
        assert_eq!(engine.share_balance(missing, &user), 0);
    }
}
