//! The set of gates an engine is constructed with.
//!
//! Both engines share one [`Gates`] value (cheap `Arc` clones), so pausing
//! or revoking an account takes effect everywhere at once.

use std::sync::Arc;

use lendswap_types::{AccountId, LendswapError, Result};

use crate::{Clock, EligibilityGate, EmergencyGate, OpenGate, SystemClock};

#[derive(Clone)]
pub struct Gates {
    pub eligibility: Arc<dyn EligibilityGate>,
    pub emergency: Arc<EmergencyGate>,
    pub clock: Arc<dyn Clock>,
}

impl Gates {
    #[must_use]
    pub fn new(
        eligibility: Arc<dyn EligibilityGate>,
        emergency: Arc<EmergencyGate>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            eligibility,
            emergency,
            clock,
        }
    }

    /// Everyone approved, wall clock, unpaused gate owned by `admin`.
    #[must_use]
    pub fn open(admin: AccountId) -> Self {
        Self::new(
            Arc::new(OpenGate),
            Arc::new(EmergencyGate::new(admin)),
            Arc::new(SystemClock),
        )
    }

    /// Entry check for caller-facing mutating calls: not paused, then
    /// eligible.
    pub fn admit(&self, caller: &AccountId) -> Result<()> {
        self.emergency.ensure_not_paused()?;
        self.eligibility.ensure_approved(caller)
    }

    /// Entry check for admin-only calls: not paused, then `caller == admin`.
    pub fn admit_admin(&self, caller: &AccountId, admin: &AccountId) -> Result<()> {
        self.emergency.ensure_not_paused()?;
        if caller != admin {
            return Err(LendswapError::NotOwner(*caller));
        }
        Ok(())
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use crate::{AllowList, ManualClock};

    use super::*;

    #[test]
    fn admit_checks_pause_before_eligibility() {
        let admin = AccountId::new();
        let gates = Gates::new(
            Arc::new(AllowList::new()),
            Arc::new(EmergencyGate::new(admin)),
            Arc::new(ManualClock::new(0)),
        );
        let user = AccountId::new();
        assert!(matches!(
            gates.admit(&user),
            Err(LendswapError::NotApproved(_))
        ));
        gates.emergency.pause(&admin).unwrap();
        assert!(matches!(gates.admit(&user), Err(LendswapError::SystemPaused)));
    }

    #[test]
    fn admit_admin_rejects_others() {
        let admin = AccountId::new();
        let gates = Gates::open(admin);
        assert!(gates.admit_admin(&admin, &admin).is_ok());
        let other = AccountId::new();
        assert!(matches!(
            gates.admit_admin(&other, &admin),
            Err(LendswapError::NotOwner(id)) if id == other
        ));
    }

    #[test]
    fn clones_share_state() {
        let admin = AccountId::new();
        let gates = Gates::open(admin);
        let other = gates.clone();
        gates.emergency.pause(&admin).unwrap();
        assert!(other.emergency.is_paused());
    }
}
