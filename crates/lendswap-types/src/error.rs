//! Error types for the lendswap engines.
//!
//! All errors use the `LS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by class:
//! - 1xx: Input validation (caller error, retry with corrected input)
//! - 2xx: Authorization (needs an external state change before retrying)
//! - 3xx: Invariant violation (economically unsafe right now)
//! - 4xx: State inconsistency (caller is working from stale assumptions)
//! - 5xx: Ledger errors
//! - 9xx: General / internal errors
//!
//! Every error aborts the whole call with no partial effect.

use thiserror::Error;

use crate::{AccountId, Amount, AssetId, PoolId};

/// Coarse error taxonomy, used by callers to pick a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InputValidation,
    Authorization,
    InvariantViolation,
    StateInconsistency,
    Ledger,
    Internal,
}

/// Central error enum for all lendswap operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendswapError {
    // =================================================================
    // Input Validation (1xx)
    // =================================================================
    /// An amount argument was zero.
    #[error("LS_ERR_100: Amount must be greater than zero")]
    ZeroAmount,

    /// Collateral factor above the protocol maximum.
    #[error("LS_ERR_101: Invalid collateral factor {factor_bps} bps (max {max_bps})")]
    InvalidFactor { factor_bps: u16, max_bps: u16 },

    /// Both sides of a pool are the same asset.
    #[error("LS_ERR_102: Pool assets must differ: {0}")]
    SamePair(AssetId),

    /// The empty (zero) asset was supplied.
    #[error("LS_ERR_103: Zero asset is not allowed")]
    ZeroAddressAsset,

    /// The input token is not one of the pool's two assets.
    #[error("LS_ERR_104: Token {token} is not part of {pool}")]
    InvalidToken { pool: PoolId, token: AssetId },

    // =================================================================
    // Authorization (2xx)
    // =================================================================
    /// The caller failed the eligibility check.
    #[error("LS_ERR_200: Account not approved: {0}")]
    NotApproved(AccountId),

    /// An admin-only entry point was called by someone else.
    #[error("LS_ERR_201: Caller is not the owner: {0}")]
    NotOwner(AccountId),

    /// The emergency gate is engaged.
    #[error("LS_ERR_202: System paused")]
    SystemPaused,

    /// An entry point was re-entered while a call was in progress.
    #[error("LS_ERR_203: Reentrant call rejected")]
    Reentrant,

    // =================================================================
    // Invariant Violation (3xx)
    // =================================================================
    /// Borrow would exceed the account's collateral-factor borrowing power.
    #[error("LS_ERR_300: Insufficient collateral: need {needed}, have {available}")]
    InsufficientCollateral { needed: Amount, available: Amount },

    /// Withdrawal would push the account below the liquidation threshold.
    #[error("LS_ERR_301: Withdrawal would leave the account undercollateralized")]
    WouldBeUndercollateralized,

    /// Liquidation attempted on an account that passes the health check.
    #[error("LS_ERR_302: Borrower is healthy: {0}")]
    BorrowerHealthy(AccountId),

    /// Not enough pool liquidity (or zero shares minted).
    #[error("LS_ERR_303: Insufficient liquidity")]
    InsufficientLiquidity,

    /// Swap output below the caller's minimum.
    #[error("LS_ERR_304: Insufficient output: got {amount_out}, minimum {amount_out_min}")]
    InsufficientOutput {
        amount_out: Amount,
        amount_out_min: Amount,
    },

    /// Proportional amount of asset A below the caller's minimum.
    #[error("LS_ERR_305: Insufficient token A amount: {amount} < {minimum}")]
    InsufficientTokenA { amount: Amount, minimum: Amount },

    /// Proportional amount of asset B below the caller's minimum.
    #[error("LS_ERR_306: Insufficient token B amount: {amount} < {minimum}")]
    InsufficientTokenB { amount: Amount, minimum: Amount },

    /// Redeemed amounts below the caller's minimums.
    #[error("LS_ERR_307: Insufficient amounts: got ({amount_a}, {amount_b})")]
    InsufficientAmounts { amount_a: Amount, amount_b: Amount },

    // =================================================================
    // State Inconsistency (4xx)
    // =================================================================
    /// Repayment larger than the outstanding debt.
    #[error("LS_ERR_400: Repay {amount} exceeds debt {debt}")]
    RepayExceedsDebt { amount: Amount, debt: Amount },

    /// Liquidation asked to cover more than the borrower owes.
    #[error("LS_ERR_401: Debt to cover {amount} exceeds borrowed {debt}")]
    InvalidDebtAmount { amount: Amount, debt: Amount },

    /// Withdrawal larger than the supplied position.
    #[error("LS_ERR_402: Withdraw {amount} exceeds supplied {supplied}")]
    WithdrawExceedsSupply { amount: Amount, supplied: Amount },

    /// Share burn larger than the caller's share balance.
    #[error("LS_ERR_403: Insufficient shares: need {needed}, have {available}")]
    InsufficientShares { needed: Amount, available: Amount },

    /// A pool for this pair already exists.
    #[error("LS_ERR_404: Pool already exists: {0}")]
    PoolExists(PoolId),

    /// A reserve for this asset already exists.
    #[error("LS_ERR_405: Reserve already exists: {0}")]
    DuplicateAsset(AssetId),

    /// No reserve is registered for this asset.
    #[error("LS_ERR_406: Unknown asset: {0}")]
    UnknownAsset(AssetId),

    /// No pool is registered under this id.
    #[error("LS_ERR_407: Pool not found: {0}")]
    PoolNotFound(PoolId),

    /// The reserve is deactivated.
    #[error("LS_ERR_408: Reserve inactive: {0}")]
    ReserveInactive(AssetId),

    /// The pool is deactivated.
    #[error("LS_ERR_409: Pool inactive: {0}")]
    PoolInactive(PoolId),

    // =================================================================
    // Ledger (5xx)
    // =================================================================
    /// Ledger balance too low for a transfer or burn.
    #[error("LS_ERR_500: Insufficient {asset} balance: need {needed}, have {available}")]
    InsufficientBalance {
        asset: AssetId,
        needed: Amount,
        available: Amount,
    },

    /// Ledger supply conservation invariant violated.
    #[error("LS_ERR_501: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Checked integer arithmetic overflowed (or underflowed).
    #[error("LS_ERR_900: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Configuration error (invalid config file, inconsistent values, etc.).
    #[error("LS_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("LS_ERR_902: Serialization error: {0}")]
    Serialization(String),
}

impl LendswapError {
    /// Taxonomy class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ZeroAmount
            | Self::InvalidFactor { .. }
            | Self::SamePair(_)
            | Self::ZeroAddressAsset
            | Self::InvalidToken { .. } => ErrorClass::InputValidation,

            Self::NotApproved(_) | Self::NotOwner(_) | Self::SystemPaused | Self::Reentrant => {
                ErrorClass::Authorization
            }

            Self::InsufficientCollateral { .. }
            | Self::WouldBeUndercollateralized
            | Self::BorrowerHealthy(_)
            | Self::InsufficientLiquidity
            | Self::InsufficientOutput { .. }
            | Self::InsufficientTokenA { .. }
            | Self::InsufficientTokenB { .. }
            | Self::InsufficientAmounts { .. } => ErrorClass::InvariantViolation,

            Self::RepayExceedsDebt { .. }
            | Self::InvalidDebtAmount { .. }
            | Self::WithdrawExceedsSupply { .. }
            | Self::InsufficientShares { .. }
            | Self::PoolExists(_)
            | Self::DuplicateAsset(_)
            | Self::UnknownAsset(_)
            | Self::PoolNotFound(_)
            | Self::ReserveInactive(_)
            | Self::PoolInactive(_) => ErrorClass::StateInconsistency,

            Self::InsufficientBalance { .. } | Self::SupplyInvariantViolation { .. } => {
                ErrorClass::Ledger
            }

            Self::ArithmeticOverflow | Self::Configuration(_) | Self::Serialization(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// Whether the same call may succeed later without changing its inputs,
    /// once pool/reserve/account state has moved on.
    #[must_use]
    pub fn is_retryable_after_state_change(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Authorization | ErrorClass::InvariantViolation | ErrorClass::Ledger
        ) && !matches!(self, Self::SupplyInvariantViolation { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LendswapError>;

impl From<serde_json::Error> for LendswapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LendswapError {
    fn from(err: std::io::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
