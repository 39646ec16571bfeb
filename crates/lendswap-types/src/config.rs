//! Configuration for the reserve and AMM engines.
//!
//! Defaults reproduce the protocol constants in [`crate::constants`]. A
//! config can be loaded from JSON; [`ProtocolConfig::validate`] rejects
//! combinations the engines cannot honor.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{LendswapError, Result, constants};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub reserve: ReserveConfig,
    pub amm: AmmConfig,
}

/// Lending reserve parameters (all in bps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReserveConfig {
    /// Supply rate assigned to a freshly added reserve.
    pub seed_supply_rate_bps: u32,
    /// Borrow rate assigned to a freshly added reserve.
    pub seed_borrow_rate_bps: u32,
    /// Borrow rate at zero utilization.
    pub base_borrow_rate_bps: u32,
    /// Extra borrow rate added linearly up to full utilization.
    pub borrow_rate_slope_bps: u32,
    /// Highest collateral factor `add_reserve` accepts.
    pub max_collateral_factor_bps: u16,
    /// Weight applied to supplied collateral for health checks.
    pub liquidation_threshold_bps: u32,
    /// Collateral seized per unit of debt covered (10_500 = 105%).
    pub liquidation_bonus_bps: u32,
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            seed_supply_rate_bps: constants::SEED_SUPPLY_RATE_BPS,
            seed_borrow_rate_bps: constants::SEED_BORROW_RATE_BPS,
            base_borrow_rate_bps: constants::BASE_BORROW_RATE_BPS,
            borrow_rate_slope_bps: constants::BORROW_RATE_SLOPE_BPS,
            max_collateral_factor_bps: constants::MAX_COLLATERAL_FACTOR_BPS,
            liquidation_threshold_bps: constants::LIQUIDATION_THRESHOLD_BPS,
            liquidation_bonus_bps: constants::LIQUIDATION_BONUS_BPS,
        }
    }
}

/// Constant-product pool parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmmConfig {
    /// Fee taken from the swap input and retained in the pool (bps).
    pub swap_fee_bps: u32,
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            swap_fee_bps: constants::SWAP_FEE_BPS,
        }
    }
}

impl AmmConfig {
    /// Share of the input that is priced (`10_000 - fee`).
    #[must_use]
    pub fn fee_multiplier_bps(&self) -> u32 {
        constants::BPS_SCALE.saturating_sub(self.swap_fee_bps)
    }
}

impl ProtocolConfig {
    /// Parse from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check internal consistency of both sections.
    ///
    /// # Errors
    /// Returns [`LendswapError::Configuration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        self.reserve.validate()?;
        self.amm.validate()
    }
}

impl ReserveConfig {
    /// # Errors
    /// Returns [`LendswapError::Configuration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        let bps = constants::BPS_SCALE;
        if self.max_collateral_factor_bps > constants::MAX_COLLATERAL_FACTOR_BPS {
            return Err(LendswapError::Configuration(format!(
                "max_collateral_factor_bps {} exceeds {}",
                self.max_collateral_factor_bps,
                constants::MAX_COLLATERAL_FACTOR_BPS
            )));
        }
        if self.liquidation_threshold_bps == 0 || self.liquidation_threshold_bps > bps {
            return Err(LendswapError::Configuration(format!(
                "liquidation_threshold_bps {} must be in 1..={bps}",
                self.liquidation_threshold_bps
            )));
        }
        if self.liquidation_bonus_bps < bps {
            return Err(LendswapError::Configuration(format!(
                "liquidation_bonus_bps {} must be at least {bps}",
                self.liquidation_bonus_bps
            )));
        }
        if self.seed_supply_rate_bps > self.seed_borrow_rate_bps {
            return Err(LendswapError::Configuration(
                "seed supply rate above seed borrow rate".to_string(),
            ));
        }
        Ok(())
    }
}

impl AmmConfig {
    /// # Errors
    /// Returns [`LendswapError::Configuration`] if the fee would consume
    /// the whole input.
    pub fn validate(&self) -> Result<()> {
        let bps = constants::BPS_SCALE;
        if self.swap_fee_bps >= bps {
            return Err(LendswapError::Configuration(format!(
                "swap_fee_bps {} must be below {bps}",
                self.swap_fee_bps
            )));
        }
        Ok(())
    }
}
