//! Eligibility gate: the external compliance check.
//!
//! The engines never know how approval is decided; they hold a handle to
//! an [`EligibilityGate`] and ask it once per caller-facing mutating call.
//! A `false` answer fails the call with `NotApproved`.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use lendswap_types::{AccountId, LendswapError, Result};

/// Boolean "is this account permitted to transact" oracle.
pub trait EligibilityGate: Send + Sync {
    fn is_approved(&self, account: &AccountId) -> bool;

    /// `Ok(())` when approved, `NotApproved` otherwise.
    fn ensure_approved(&self, account: &AccountId) -> Result<()> {
        if self.is_approved(account) {
            Ok(())
        } else {
            tracing::warn!(account = %account.short(), "Eligibility check failed");
            Err(LendswapError::NotApproved(*account))
        }
    }
}

/// Explicit allow set. Accounts can be approved and revoked at any time.
#[derive(Default)]
pub struct AllowList {
    approved: RwLock<HashSet<AccountId>>,
}

impl AllowList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow list seeded with `accounts`.
    #[must_use]
    pub fn with_accounts(accounts: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            approved: RwLock::new(accounts.into_iter().collect()),
        }
    }

    pub fn approve(&self, account: AccountId) {
        self.approved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account);
    }

    pub fn revoke(&self, account: &AccountId) {
        self.approved
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(account);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.approved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EligibilityGate for AllowList {
    fn is_approved(&self, account: &AccountId) -> bool {
        self.approved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(account)
    }
}

/// Approves every account.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenGate;

impl EligibilityGate for OpenGate {
    fn is_approved(&self, _account: &AccountId) -> bool {
        true
    }
}
