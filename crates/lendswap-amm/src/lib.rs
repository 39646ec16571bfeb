//! # lendswap-amm
//!
//! **Exchange plane**: constant-product (`x * y = k`) pools with fungible
//! liquidity shares.
//!
//! ## Architecture
//!
//! [`PoolEngine`] owns every [`Pool`](lendswap_types::Pool) keyed by its
//! deterministic [`PoolId`](lendswap_types::PoolId). The pure pricing and
//! share arithmetic lives in [`math`]; the engine adds gating, ledger
//! transfers, rollback and the event journal.
//!
//! ## Swap Flow
//!
//! ```text
//! swap → guard → pause → eligibility → active pool → price (math)
//!      → slippage check → pull token_in → commit reserves → pay token_out
//! ```
//!
//! The fee stays in the pool, so `reserve_a * reserve_b` never decreases
//! across a swap.

pub mod engine;
pub mod math;

pub use engine::PoolEngine;
