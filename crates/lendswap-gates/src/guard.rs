//! Execution guard: rejects reentrant calls into an engine.
//!
//! Each engine owns one guard. Every mutating entry point takes a
//! [`GuardToken`] for its whole duration; the token releases the guard on
//! drop, including on early `?` returns. The guard is shared through an
//! `Arc`, so a collaborator that calls back into the engine mid-call (a
//! hostile ledger, say) observes it held and is turned away.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lendswap_types::{LendswapError, Result};

/// Exclusive execution flag.
#[derive(Debug, Default)]
pub struct ExecutionGuard {
    entered: AtomicBool,
}

impl ExecutionGuard {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take the guard for the duration of one call.
    ///
    /// # Errors
    /// [`LendswapError::Reentrant`] if a call is already in progress.
    pub fn enter(self: &Arc<Self>) -> Result<GuardToken> {
        if self
            .entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Reentrant call rejected");
            return Err(LendswapError::Reentrant);
        }
        Ok(GuardToken {
            guard: Arc::clone(self),
        })
    }

    /// Whether a call currently holds the guard.
    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Proof of holding the guard; releases it on drop.
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
    guard: Arc<ExecutionGuard>,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_is_rejected() {
        let guard = ExecutionGuard::new();
        let token = guard.enter().unwrap();
        assert!(guard.is_entered());
        assert!(matches!(guard.enter(), Err(LendswapError::Reentrant)));
        drop(token);
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn early_return_releases_guard() {
        fn failing_call(guard: &Arc<ExecutionGuard>) -> Result<()> {
            let _token = guard.enter()?;
            Err(LendswapError::ZeroAmount)
        }

        let guard = ExecutionGuard::new();
        assert!(failing_call(&guard).is_err());
        assert!(!guard.is_entered());
    }

    #[test]
    fn shared_handle_sees_entry() {
        let guard = ExecutionGuard::new();
        let observer = Arc::clone(&guard);
        let _token = guard.enter().unwrap();
        assert!(observer.is_entered());
        assert!(observer.enter().is_err());
    }
}
