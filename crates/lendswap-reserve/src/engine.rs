//! Reserve accounting engine.
//!
//! Every mutating entry point follows the same shape:
//! 1. Take the execution guard, then pass the emergency and eligibility
//!    (or admin) gates
//! 2. Validate inputs against current state
//! 3. Stage accrued reserves and updated positions in a [`Changeset`]
//! 4. Pull inbound funds from the caller
//! 5. Commit the changeset
//! 6. Pay out last; a failed pay-out restores the pre-commit records
//! 7. Journal the events
//!
//! A call that returns an error leaves reserves, positions, the journal and
//! ledger balances exactly as they were.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use lendswap_gates::{BalanceLedger, EventJournal, ExecutionGuard, Gates};
use lendswap_types::amount::{self, Amount};
use lendswap_types::{
    AccountId, AccountPosition, AccountRecord, AssetId, Event, EventKind, LendswapError,
    ReserveConfig, ReserveState, Result,
};
use rust_decimal::Decimal;

use crate::health::AccountSnapshot;
use crate::interest;

const CUSTODY_LABEL: &str = "lendswap:reserve:custody";

/// Reserve and position updates of one call, not yet visible.
#[derive(Debug, Default)]
struct Changeset {
    reserves: BTreeMap<AssetId, ReserveState>,
    positions: BTreeMap<(AccountId, AssetId), AccountPosition>,
}

/// Records a commit overwrote.
#[derive(Debug, Default)]
struct Snapshot {
    reserves: Vec<ReserveState>,
    positions: Vec<(AccountId, AssetId, Option<AccountPosition>)>,
    created_accounts: Vec<AccountId>,
}

/// Multi-asset collateralized lending market.
///
/// Funds sit in a single custody account on the ledger; the per-reserve
/// totals are bookkeeping and never cap a borrow. The ledger balance of the
/// custody account does.
pub struct ReserveEngine {
    admin: AccountId,
    custody: AccountId,
    config: ReserveConfig,
    gates: Gates,
    guard: Arc<ExecutionGuard>,
    reserves: BTreeMap<AssetId, ReserveState>,
    accounts: HashMap<AccountId, AccountRecord>,
    journal: EventJournal,
}

impl ReserveEngine {
    /// # Errors
    /// [`LendswapError::Configuration`] if `config` fails validation.
    pub fn new(admin: AccountId, config: ReserveConfig, gates: Gates) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            admin,
            custody: AccountId::from_label(CUSTODY_LABEL),
            config,
            gates,
            guard: ExecutionGuard::new(),
            reserves: BTreeMap::new(),
            accounts: HashMap::new(),
            journal: EventJournal::new(),
        })
    }

    // ── Admin ──────────────────────────────────────────────────────────

    /// Register a new asset with seed rates.
    ///
    /// # Errors
    /// `NotOwner`, `SystemPaused`, `ZeroAddressAsset`, `DuplicateAsset`,
    /// `InvalidFactor`.
    pub fn add_reserve(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        collateral_factor_bps: u16,
    ) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit_admin(&caller, &self.admin)?;

        if asset.is_zero() {
            return Err(LendswapError::ZeroAddressAsset);
        }
        if self.reserves.contains_key(&asset) {
            return Err(LendswapError::DuplicateAsset(asset));
        }
        if collateral_factor_bps > self.config.max_collateral_factor_bps {
            return Err(LendswapError::InvalidFactor {
                factor_bps: collateral_factor_bps,
                max_bps: self.config.max_collateral_factor_bps,
            });
        }

        let now = self.gates.now();
        let reserve = ReserveState::new(
            asset.clone(),
            collateral_factor_bps,
            self.config.seed_supply_rate_bps,
            self.config.seed_borrow_rate_bps,
            now,
        );
        self.reserves.insert(asset.clone(), reserve);

        tracing::info!(asset = %asset, collateral_factor_bps, "Reserve added");
        self.journal.record(
            now,
            EventKind::ReserveAdded {
                asset,
                collateral_factor_bps,
            },
        );
        Ok(())
    }

    /// Open or close a reserve to new supply and borrows.
    ///
    /// Setting the current status again is a no-op and journals nothing.
    pub fn set_reserve_active(
        &mut self,
        caller: AccountId,
        asset: &AssetId,
        active: bool,
    ) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit_admin(&caller, &self.admin)?;

        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or_else(|| LendswapError::UnknownAsset(asset.clone()))?;
        if reserve.active == active {
            return Ok(());
        }
        reserve.active = active;

        tracing::info!(asset = %asset, active, "Reserve status changed");
        self.journal.record(
            self.gates.now(),
            EventKind::ReserveStatusChanged {
                asset: asset.clone(),
                active,
            },
        );
        Ok(())
    }

    // ── Caller-facing ──────────────────────────────────────────────────

    /// Deposit `amount` of `asset` as supplied collateral.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `UnknownAsset`, `ReserveInactive`, or the
    /// ledger's error if the caller cannot fund the transfer.
    pub fn supply(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(amount)?;
        self.active_reserve(asset)?;
        let now = self.gates.now();

        // 1. Stage
        let mut changes = Changeset::default();
        let reserve = self.stage_reserve(&mut changes, asset, now)?;
        reserve.total_supplied = amount::add(reserve.total_supplied, amount)?;
        let total_supplied = reserve.total_supplied;
        let position = self.stage_position(&mut changes, caller, asset);
        position.supplied = amount::add(position.supplied, amount)?;
        let position_supplied = position.supplied;

        // 2. Pull
        ledger.transfer(&caller, &self.custody, asset, amount)?;

        // 3. Commit
        let snapshot = self.commit(changes);
        self.record_rate_updates(&snapshot, now);

        tracing::info!(
            asset = %asset,
            account = %caller,
            amount = %amount,
            position_supplied = %position_supplied,
            total_supplied = %total_supplied,
            "Supplied"
        );
        self.journal.record(
            now,
            EventKind::Supplied {
                asset: asset.clone(),
                account: caller,
                amount,
                position_supplied,
                total_supplied,
            },
        );
        Ok(())
    }

    /// Borrow `amount` of `asset` against all supplied collateral.
    ///
    /// Succeeds iff `Σ floor(supplied[a] * cf[a] / 10_000) ≥ Σ borrowed[a] +
    /// amount`.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `UnknownAsset`, `ReserveInactive`,
    /// `InsufficientCollateral`, or the ledger's error if custody cannot
    /// pay out.
    pub fn borrow(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(amount)?;
        self.active_reserve(asset)?;
        let now = self.gates.now();

        // 1. Collateralization
        let health = self.account_snapshot(&caller)?;
        if !health.can_borrow(amount) {
            let needed = amount::add(health.borrow_value, amount)?;
            tracing::warn!(
                account = %caller,
                asset = %asset,
                amount = %amount,
                needed = %needed,
                available = %health.collateral_value,
                "Borrow rejected: insufficient collateral"
            );
            return Err(LendswapError::InsufficientCollateral {
                needed,
                available: health.collateral_value,
            });
        }

        // 2. Stage
        let mut changes = Changeset::default();
        let reserve = self.stage_reserve(&mut changes, asset, now)?;
        reserve.total_borrowed = amount::add(reserve.total_borrowed, amount)?;
        let total_borrowed = reserve.total_borrowed;
        let position = self.stage_position(&mut changes, caller, asset);
        position.borrowed = amount::add(position.borrowed, amount)?;
        let position_borrowed = position.borrowed;

        // 3. Commit, then pay out
        let snapshot = self.commit(changes);
        let snapshot = self.pay_out(ledger, snapshot, &caller, asset, amount)?;
        self.record_rate_updates(&snapshot, now);

        tracing::info!(
            asset = %asset,
            account = %caller,
            amount = %amount,
            position_borrowed = %position_borrowed,
            total_borrowed = %total_borrowed,
            "Borrowed"
        );
        self.journal.record(
            now,
            EventKind::Borrowed {
                asset: asset.clone(),
                account: caller,
                amount,
                position_borrowed,
                total_borrowed,
            },
        );
        Ok(())
    }

    /// Pay back `amount` of the caller's own debt in `asset`.
    ///
    /// Allowed on inactive reserves.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `UnknownAsset`, `RepayExceedsDebt`, or the
    /// ledger's error if the caller cannot fund the transfer.
    pub fn repay(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(amount)?;
        self.known_reserve(asset)?;

        let debt = self.position(&caller, asset).borrowed;
        if debt < amount {
            return Err(LendswapError::RepayExceedsDebt { amount, debt });
        }
        let now = self.gates.now();

        // 1. Stage
        let mut changes = Changeset::default();
        let reserve = self.stage_reserve(&mut changes, asset, now)?;
        reserve.total_borrowed = amount::sub(reserve.total_borrowed, amount)?;
        let total_borrowed = reserve.total_borrowed;
        let position = self.stage_position(&mut changes, caller, asset);
        position.borrowed = amount::sub(position.borrowed, amount)?;
        let position_borrowed = position.borrowed;

        // 2. Pull
        ledger.transfer(&caller, &self.custody, asset, amount)?;

        // 3. Commit
        let snapshot = self.commit(changes);
        self.record_rate_updates(&snapshot, now);

        tracing::info!(
            asset = %asset,
            account = %caller,
            amount = %amount,
            position_borrowed = %position_borrowed,
            total_borrowed = %total_borrowed,
            "Repaid"
        );
        self.journal.record(
            now,
            EventKind::Repaid {
                asset: asset.clone(),
                account: caller,
                amount,
                position_borrowed,
                total_borrowed,
            },
        );
        Ok(())
    }

    /// Take back `amount` of supplied `asset`.
    ///
    /// The remaining positions must satisfy the liquidation-threshold health
    /// check. Allowed on inactive reserves.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `UnknownAsset`, `WithdrawExceedsSupply`,
    /// `WouldBeUndercollateralized`, or the ledger's error if custody cannot
    /// pay out.
    pub fn withdraw(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(amount)?;
        self.known_reserve(asset)?;

        let supplied = self.position(&caller, asset).supplied;
        if supplied < amount {
            return Err(LendswapError::WithdrawExceedsSupply { amount, supplied });
        }
        let now = self.gates.now();

        // 1. Stage
        let mut changes = Changeset::default();
        let reserve = self.stage_reserve(&mut changes, asset, now)?;
        reserve.total_supplied = amount::sub(reserve.total_supplied, amount)?;
        let total_supplied = reserve.total_supplied;
        let position = self.stage_position(&mut changes, caller, asset);
        position.supplied = amount::sub(position.supplied, amount)?;
        let position_supplied = position.supplied;

        // 2. Health after the decrement; dropping `changes` rolls it back
        let after = self.staged_snapshot(&changes, &caller)?;
        if !after.is_healthy() {
            tracing::warn!(
                account = %caller,
                asset = %asset,
                amount = %amount,
                threshold_value = %after.threshold_value,
                borrow_value = %after.borrow_value,
                "Withdraw rejected: would be undercollateralized"
            );
            return Err(LendswapError::WouldBeUndercollateralized);
        }

        // 3. Commit, then pay out
        let snapshot = self.commit(changes);
        let snapshot = self.pay_out(ledger, snapshot, &caller, asset, amount)?;
        self.record_rate_updates(&snapshot, now);

        tracing::info!(
            asset = %asset,
            account = %caller,
            amount = %amount,
            position_supplied = %position_supplied,
            total_supplied = %total_supplied,
            "Withdrawn"
        );
        self.journal.record(
            now,
            EventKind::Withdrawn {
                asset: asset.clone(),
                account: caller,
                amount,
                position_supplied,
                total_supplied,
            },
        );
        Ok(())
    }

    /// Repay `debt_to_cover` of an unhealthy borrower's debt and seize
    /// `debt_to_cover * bonus` of their collateral.
    ///
    /// # Errors
    /// Gate errors, `ZeroAmount`, `UnknownAsset`, then in order
    /// `BorrowerHealthy`, `InvalidDebtAmount`, `InsufficientCollateral`, or a
    /// ledger error on either transfer.
    pub fn liquidate(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        caller: AccountId,
        borrower: AccountId,
        collateral_asset: &AssetId,
        debt_asset: &AssetId,
        debt_to_cover: Amount,
    ) -> Result<()> {
        let _token = self.guard.enter()?;
        self.gates.admit(&caller)?;
        ensure_nonzero(debt_to_cover)?;
        self.known_reserve(collateral_asset)?;
        self.known_reserve(debt_asset)?;
        let now = self.gates.now();

        // 1. Accrue both reserves
        let mut changes = Changeset::default();
        self.stage_reserve(&mut changes, collateral_asset, now)?;
        self.stage_reserve(&mut changes, debt_asset, now)?;

        // 2. Eligibility of the borrower for liquidation
        let health = self.account_snapshot(&borrower)?;
        if health.is_healthy() {
            tracing::warn!(
                liquidator = %caller,
                borrower = %borrower,
                threshold_value = %health.threshold_value,
                borrow_value = %health.borrow_value,
                "Liquidation rejected: borrower healthy"
            );
            return Err(LendswapError::BorrowerHealthy(borrower));
        }
        let debt = self.position(&borrower, debt_asset).borrowed;
        if debt < debt_to_cover {
            return Err(LendswapError::InvalidDebtAmount {
                amount: debt_to_cover,
                debt,
            });
        }
        let collateral_to_seize =
            amount::apply_bps(debt_to_cover, self.config.liquidation_bonus_bps)?;
        let collateral = self.position(&borrower, collateral_asset).supplied;
        if collateral < collateral_to_seize {
            tracing::warn!(
                borrower = %borrower,
                collateral_asset = %collateral_asset,
                needed = %collateral_to_seize,
                available = %collateral,
                "Liquidation rejected: insufficient collateral"
            );
            return Err(LendswapError::InsufficientCollateral {
                needed: collateral_to_seize,
                available: collateral,
            });
        }

        // 3. Stage the transfer of debt and collateral
        let reserve = self.stage_reserve(&mut changes, debt_asset, now)?;
        reserve.total_borrowed = amount::sub(reserve.total_borrowed, debt_to_cover)?;
        let position = self.stage_position(&mut changes, borrower, debt_asset);
        position.borrowed = amount::sub(position.borrowed, debt_to_cover)?;

        let reserve = self.stage_reserve(&mut changes, collateral_asset, now)?;
        reserve.total_supplied = amount::sub(reserve.total_supplied, collateral_to_seize)?;
        let position = self.stage_position(&mut changes, borrower, collateral_asset);
        position.supplied = amount::sub(position.supplied, collateral_to_seize)?;

        // 4. Pull debt, commit, pay collateral
        ledger.transfer(&caller, &self.custody, debt_asset, debt_to_cover)?;
        let snapshot = self.commit(changes);
        let snapshot =
            match self.pay_out(ledger, snapshot, &caller, collateral_asset, collateral_to_seize) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    if let Err(refund) =
                        ledger.transfer(&self.custody, &caller, debt_asset, debt_to_cover)
                    {
                        tracing::error!(
                            liquidator = %caller,
                            asset = %debt_asset,
                            amount = %debt_to_cover,
                            error = %refund,
                            "Refund of pulled debt failed"
                        );
                    }
                    return Err(err);
                }
            };
        self.record_rate_updates(&snapshot, now);

        tracing::info!(
            liquidator = %caller,
            borrower = %borrower,
            collateral_asset = %collateral_asset,
            debt_asset = %debt_asset,
            debt_covered = %debt_to_cover,
            collateral_seized = %collateral_to_seize,
            "Liquidated"
        );
        self.journal.record(
            now,
            EventKind::Liquidated {
                liquidator: caller,
                borrower,
                collateral_asset: collateral_asset.clone(),
                debt_asset: debt_asset.clone(),
                debt_covered: debt_to_cover,
                collateral_seized: collateral_to_seize,
            },
        );
        Ok(())
    }

    // ── Views ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn reserve(&self, asset: &AssetId) -> Option<&ReserveState> {
        self.reserves.get(asset)
    }

    /// All reserves, ordered by asset.
    pub fn reserves(&self) -> impl Iterator<Item = &ReserveState> {
        self.reserves.values()
    }

    /// Position of `account` in `asset`, zero if never touched.
    #[must_use]
    pub fn position(&self, account: &AccountId, asset: &AssetId) -> AccountPosition {
        self.accounts
            .get(account)
            .map(|record| record.position(asset))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn account(&self, account: &AccountId) -> Option<&AccountRecord> {
        self.accounts.get(account)
    }

    pub fn account_snapshot(&self, account: &AccountId) -> Result<AccountSnapshot> {
        let empty = AccountRecord::new();
        let record = self.accounts.get(account).unwrap_or(&empty);
        AccountSnapshot::compute(record, &self.reserves, self.config.liquidation_threshold_bps)
    }

    /// Liquidation-threshold value over debt; `None` without debt.
    pub fn health_factor(&self, account: &AccountId) -> Result<Option<Decimal>> {
        Ok(self.account_snapshot(account)?.health_factor())
    }

    pub fn is_liquidatable(&self, account: &AccountId) -> Result<bool> {
        Ok(!self.account_snapshot(account)?.is_healthy())
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

    /// Ledger account holding all pooled funds.
    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    #[must_use]
    pub fn config(&self) -> &ReserveConfig {
        &self.config
    }

    /// Shared handle to this engine's execution guard.
    #[must_use]
    pub fn guard(&self) -> Arc<ExecutionGuard> {
        Arc::clone(&self.guard)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn known_reserve(&self, asset: &AssetId) -> Result<&ReserveState> {
        self.reserves
            .get(asset)
            .ok_or_else(|| LendswapError::UnknownAsset(asset.clone()))
    }

    fn active_reserve(&self, asset: &AssetId) -> Result<&ReserveState> {
        let reserve = self.known_reserve(asset)?;
        if !reserve.active {
            return Err(LendswapError::ReserveInactive(asset.clone()));
        }
        Ok(reserve)
    }

    /// Stage `asset`'s reserve, accrued to `now`, on first touch.
    fn stage_reserve<'c>(
        &self,
        changes: &'c mut Changeset,
        asset: &AssetId,
        now: u64,
    ) -> Result<&'c mut ReserveState> {
        if !changes.reserves.contains_key(asset) {
            let accrued = interest::accrue(self.known_reserve(asset)?, now, &self.config);
            changes.reserves.insert(asset.clone(), accrued);
        }
        changes
            .reserves
            .get_mut(asset)
            .ok_or_else(|| LendswapError::UnknownAsset(asset.clone()))
    }

    fn stage_position<'c>(
        &self,
        changes: &'c mut Changeset,
        account: AccountId,
        asset: &AssetId,
    ) -> &'c mut AccountPosition {
        let current = self.position(&account, asset);
        changes
            .positions
            .entry((account, asset.clone()))
            .or_insert(current)
    }

    /// Valuation of `account` as if `changes` were committed.
    fn staged_snapshot(&self, changes: &Changeset, account: &AccountId) -> Result<AccountSnapshot> {
        let mut record = self.accounts.get(account).cloned().unwrap_or_default();
        for ((owner, asset), position) in &changes.positions {
            if owner == account {
                *record.position_mut(asset) = *position;
            }
        }
        AccountSnapshot::compute(&record, &self.reserves, self.config.liquidation_threshold_bps)
    }

    fn commit(&mut self, changes: Changeset) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (asset, reserve) in changes.reserves {
            if let Some(previous) = self.reserves.insert(asset, reserve) {
                snapshot.reserves.push(previous);
            }
        }
        for ((account, asset), position) in changes.positions {
            let record = match self.accounts.entry(account) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    snapshot.created_accounts.push(account);
                    entry.insert(AccountRecord::new())
                }
            };
            let previous = record.positions.insert(asset.clone(), position);
            snapshot.positions.push((account, asset, previous));
        }
        snapshot
    }

    fn restore(&mut self, snapshot: Snapshot) {
        for reserve in snapshot.reserves {
            self.reserves.insert(reserve.asset.clone(), reserve);
        }
        for (account, asset, previous) in snapshot.positions {
            if let Some(record) = self.accounts.get_mut(&account) {
                match previous {
                    Some(position) => {
                        record.positions.insert(asset, position);
                    }
                    None => {
                        record.positions.remove(&asset);
                    }
                }
            }
        }
        for account in snapshot.created_accounts {
            self.accounts.remove(&account);
        }
    }

    /// Final custody → `to` transfer. On failure the commit is undone.
    fn pay_out(
        &mut self,
        ledger: &mut dyn BalanceLedger,
        snapshot: Snapshot,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<Snapshot> {
        match ledger.transfer(&self.custody, to, asset, amount) {
            Ok(()) => Ok(snapshot),
            Err(err) => {
                tracing::warn!(
                    to = %to,
                    asset = %asset,
                    amount = %amount,
                    error = %err,
                    "Pay-out failed, state restored"
                );
                self.restore(snapshot);
                Err(err)
            }
        }
    }

    /// Journal a `RatesUpdated` for every reserve whose rates were
    /// recomputed by the committed call.
    fn record_rate_updates(&mut self, snapshot: &Snapshot, now: u64) {
        for previous in &snapshot.reserves {
            let Some(current) = self.reserves.get(&previous.asset) else {
                continue;
            };
            if current.last_update_timestamp == previous.last_update_timestamp {
                continue;
            }
            // Utilization as it stood when the rates were computed.
            let kind = EventKind::RatesUpdated {
                asset: current.asset.clone(),
                utilization_bps: previous.utilization_bps(),
                supply_rate_bps: current.supply_rate_bps,
                borrow_rate_bps: current.borrow_rate_bps,
            };
            self.journal.record(now, kind);
        }
    }
}

fn ensure_nonzero(amount: Amount) -> Result<()> {
    if amount == 0 {
        return Err(LendswapError::ZeroAmount);
    }
    Ok(())
}
