//! # lendswap-reserve
//!
//! **Lending plane**: a pooled, multi-asset lending market where supplied
//! assets double as collateral.
//!
//! ## Architecture
//!
//! One [`ReserveEngine`] holds a [`ReserveState`](lendswap_types::ReserveState)
//! per supported asset and an
//! [`AccountRecord`](lendswap_types::AccountRecord) per participant. Every
//! mutating call:
//! 1. Takes the execution guard and passes the shared gates
//! 2. Recomputes the touched reserves' rates ([`interest::accrue`])
//! 3. Stages position and total changes and checks them ([`health`])
//! 4. Pulls inbound funds, commits, then pays out last
//! 5. Journals one event per committed change
//!
//! Collateral is unit-additive: balances across assets are summed without
//! price conversion.

pub mod engine;
pub mod health;
pub mod interest;

pub use engine::ReserveEngine;
pub use health::AccountSnapshot;
