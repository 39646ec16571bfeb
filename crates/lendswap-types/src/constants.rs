//! Protocol-wide constants for the lendswap engines.
//!
//! These are the defaults behind [`crate::ProtocolConfig::default`]. Rates and
//! ratios are in basis points unless noted otherwise.

/// Basis-point scale (100% = 10_000 bps).
pub const BPS_SCALE: u32 = 10_000;

/// Seed supply rate for a freshly added reserve (2%).
pub const SEED_SUPPLY_RATE_BPS: u32 = 200;

/// Seed borrow rate for a freshly added reserve (4%).
pub const SEED_BORROW_RATE_BPS: u32 = 400;

/// Borrow rate at zero utilization (4%).
pub const BASE_BORROW_RATE_BPS: u32 = 400;

/// Additional borrow rate at full utilization (20%).
pub const BORROW_RATE_SLOPE_BPS: u32 = 2_000;

/// Upper bound on a reserve's collateral factor (90%).
pub const MAX_COLLATERAL_FACTOR_BPS: u16 = 9_000;

/// Liquidation threshold applied to all supplied collateral (80%).
pub const LIQUIDATION_THRESHOLD_BPS: u32 = 8_000;

/// Collateral paid per unit of debt covered, including the 5% bonus (105%).
pub const LIQUIDATION_BONUS_BPS: u32 = 10_500;

/// Swap fee retained by the pool (0.3%).
pub const SWAP_FEE_BPS: u32 = 30;

/// Domain separator for deterministic pool identifiers.
pub const POOL_ID_DOMAIN: &[u8] = b"lendswap:pool_id:v1:";

/// Domain separator for label-derived account identifiers.
pub const ACCOUNT_ID_DOMAIN: &[u8] = b"lendswap:account_id:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Lendswap";
