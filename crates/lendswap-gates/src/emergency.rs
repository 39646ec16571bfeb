//! Emergency gate: a binary paused/unpaused switch shared by both engines.
//!
//! Every mutating entry point calls [`EmergencyGate::ensure_not_paused`]
//! before anything else is checked. Only the admin can flip the switch, and
//! every flip is journaled on the gate itself, since no single engine owns it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lendswap_types::{AccountId, Event, EventKind, LendswapError, Result};

use crate::{Clock, EventJournal, SystemClock};

/// Shared pause switch. Engines hold it behind an `Arc`.
pub struct EmergencyGate {
    /// Account allowed to pause and unpause.
    admin: AccountId,
    paused: AtomicBool,
    clock: Arc<dyn Clock>,
    journal: Mutex<EventJournal>,
}

impl EmergencyGate {
    /// Create an unpaused gate controlled by `admin`, stamped by the wall
    /// clock.
    #[must_use]
    pub fn new(admin: AccountId) -> Self {
        Self::with_clock(admin, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(admin: AccountId, clock: Arc<dyn Clock>) -> Self {
        Self {
            admin,
            paused: AtomicBool::new(false),
            clock,
            journal: Mutex::new(EventJournal::new()),
        }
    }

    #[must_use]
    pub fn admin(&self) -> AccountId {
        self.admin
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Engage the gate.
    ///
    /// # Errors
    /// [`LendswapError::NotOwner`] if `caller` is not the admin.
    pub fn pause(&self, caller: &AccountId) -> Result<()> {
        self.set(caller, true)
    }

    /// Release the gate.
    ///
    /// # Errors
    /// [`LendswapError::NotOwner`] if `caller` is not the admin.
    pub fn unpause(&self, caller: &AccountId) -> Result<()> {
        self.set(caller, false)
    }

    /// Copy of every pause and unpause recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.lock_journal().events().to_vec()
    }

    /// Snapshot of the gate's journal, e.g. for JSON export.
    #[must_use]
    pub fn journal(&self) -> EventJournal {
        self.lock_journal().clone()
    }

    fn set(&self, caller: &AccountId, paused: bool) -> Result<()> {
        if *caller != self.admin {
            return Err(LendswapError::NotOwner(*caller));
        }
        // Held across the swap so journal order matches toggle order.
        let mut journal = self.lock_journal();
        let was = self.paused.swap(paused, Ordering::SeqCst);
        if was == paused {
            return Ok(());
        }
        tracing::warn!(by = %caller.short(), paused, "Emergency gate toggled");
        let kind = if paused {
            EventKind::EmergencyPaused { by: *caller }
        } else {
            EventKind::EmergencyUnpaused { by: *caller }
        };
        journal.record(self.clock.now(), kind);
        Ok(())
    }

    fn lock_journal(&self) -> MutexGuard<'_, EventJournal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Guard a mutating call. Returns `Ok(())` when unpaused,
    /// or [`LendswapError::SystemPaused`] when paused.
    pub fn ensure_not_paused(&self) -> Result<()> {
        if self.is_paused() {
            Err(LendswapError::SystemPaused)
        } else {
            Ok(())
        }
    }
}
