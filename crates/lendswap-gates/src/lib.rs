//! # lendswap-gates
//!
//! **Collaborator plane**: everything the engines consult or mutate but do
//! not own.
//!
//! ## Architecture
//!
//! Both engines sit behind the same set of gates:
//! 1. **ExecutionGuard**: rejects reentrant entry while a call is in flight
//! 2. **EmergencyGate**: shared paused/unpaused switch held by the admin
//! 3. **EligibilityGate**: external "is this account permitted" oracle
//! 4. **BalanceLedger**: fungible balances per (account, asset)
//! 5. **EventJournal**: append-only record of committed changes
//!
//! ## Call Flow
//!
//! ```text
//! caller → ExecutionGuard.enter() → EmergencyGate.ensure_not_paused()
//!        → EligibilityGate.is_approved() → engine checks
//!        → BalanceLedger pull → engine commit → BalanceLedger pay-out
//!        → EventJournal.record()
//! ```

pub mod bundle;
pub mod clock;
pub mod eligibility;
pub mod emergency;
pub mod guard;
pub mod journal;
pub mod ledger;
pub mod supply;

pub use bundle::Gates;
pub use clock::{Clock, ManualClock, SystemClock};
pub use eligibility::{AllowList, EligibilityGate, OpenGate};
pub use emergency::EmergencyGate;
pub use guard::{ExecutionGuard, GuardToken};
pub use journal::EventJournal;
pub use ledger::{BalanceLedger, InMemoryLedger};
pub use supply::SupplyConservation;
