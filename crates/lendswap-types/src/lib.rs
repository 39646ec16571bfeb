//! # lendswap-types
//!
//! Shared types, errors, and configuration for the **lendswap** settlement
//! layer.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AssetId`], [`PoolId`]
//! - **Amounts**: [`Amount`] and checked integer helpers in [`amount`]
//! - **Lending model**: [`ReserveState`], [`AccountPosition`], [`AccountRecord`]
//! - **Pool model**: [`Pool`]
//! - **Events**: [`Event`], [`EventKind`]
//! - **Configuration**: [`ProtocolConfig`], [`ReserveConfig`], [`AmmConfig`]
//! - **Errors**: [`LendswapError`] with `LS_ERR_` prefix codes
//! - **Constants**: protocol defaults (rates, thresholds, fees)

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod pool;
pub mod reserve;

// Re-export all primary types at crate root for ergonomic imports:
//   use lendswap_types::{AccountId, AssetId, ReserveState, Pool, ...};

pub use amount::Amount;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use pool::*;
pub use reserve::*;

// Constants are accessed via `lendswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
