//! Event records for off-chain indexing.
//!
//! Every committed state change appends one [`Event`] to its engine's
//! journal. Events are the only history kept beyond current-state fields,
//! so each carries the resulting totals alongside the amounts moved.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, PoolId};

/// What happened, with the amounts and resulting totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    ReserveAdded {
        asset: AssetId,
        collateral_factor_bps: u16,
    },
    ReserveStatusChanged {
        asset: AssetId,
        active: bool,
    },
    RatesUpdated {
        asset: AssetId,
        utilization_bps: Amount,
        supply_rate_bps: u32,
        borrow_rate_bps: u32,
    },
    Supplied {
        asset: AssetId,
        account: AccountId,
        amount: Amount,
        position_supplied: Amount,
        total_supplied: Amount,
    },
    Borrowed {
        asset: AssetId,
        account: AccountId,
        amount: Amount,
        position_borrowed: Amount,
        total_borrowed: Amount,
    },
    Repaid {
        asset: AssetId,
        account: AccountId,
        amount: Amount,
        position_borrowed: Amount,
        total_borrowed: Amount,
    },
    Withdrawn {
        asset: AssetId,
        account: AccountId,
        amount: Amount,
        position_supplied: Amount,
        total_supplied: Amount,
    },
    Liquidated {
        liquidator: AccountId,
        borrower: AccountId,
        collateral_asset: AssetId,
        debt_asset: AssetId,
        debt_covered: Amount,
        collateral_seized: Amount,
    },
    PoolCreated {
        pool: PoolId,
        asset_a: AssetId,
        asset_b: AssetId,
    },
    PoolStatusChanged {
        pool: PoolId,
        active: bool,
    },
    LiquidityAdded {
        pool: PoolId,
        account: AccountId,
        amount_a: Amount,
        amount_b: Amount,
        liquidity: Amount,
        reserve_a: Amount,
        reserve_b: Amount,
        total_shares: Amount,
    },
    LiquidityRemoved {
        pool: PoolId,
        account: AccountId,
        amount_a: Amount,
        amount_b: Amount,
        liquidity: Amount,
        reserve_a: Amount,
        reserve_b: Amount,
        total_shares: Amount,
    },
    Swapped {
        pool: PoolId,
        account: AccountId,
        token_in: AssetId,
        amount_in: Amount,
        amount_out: Amount,
        reserve_a: Amount,
        reserve_b: Amount,
    },
    EmergencyPaused {
        by: AccountId,
    },
    EmergencyUnpaused {
        by: AccountId,
    },
}

impl EventKind {
    /// Stable upper-case name, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReserveAdded { .. } => "RESERVE_ADDED",
            Self::ReserveStatusChanged { .. } => "RESERVE_STATUS_CHANGED",
            Self::RatesUpdated { .. } => "RATES_UPDATED",
            Self::Supplied { .. } => "SUPPLIED",
            Self::Borrowed { .. } => "BORROWED",
            Self::Repaid { .. } => "REPAID",
            Self::Withdrawn { .. } => "WITHDRAWN",
            Self::Liquidated { .. } => "LIQUIDATED",
            Self::PoolCreated { .. } => "POOL_CREATED",
            Self::PoolStatusChanged { .. } => "POOL_STATUS_CHANGED",
            Self::LiquidityAdded { .. } => "LIQUIDITY_ADDED",
            Self::LiquidityRemoved { .. } => "LIQUIDITY_REMOVED",
            Self::Swapped { .. } => "SWAPPED",
            Self::EmergencyPaused { .. } => "EMERGENCY_PAUSED",
            Self::EmergencyUnpaused { .. } => "EMERGENCY_UNPAUSED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An append-only journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the emitting journal, starting at 0.
    pub sequence: u64,
    /// Seconds timestamp at which the change was committed.
    pub timestamp: u64,
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_display() {
        let kind = EventKind::ReserveAdded {
            asset: AssetId::from("X"),
            collateral_factor_bps: 7500,
        };
        assert_eq!(format!("{kind}"), "RESERVE_ADDED");
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = Event {
            sequence: 3,
            timestamp: 42,
            kind: EventKind::Supplied {
                asset: AssetId::from("X"),
                account: AccountId::from_label("alice"),
                amount: 1000,
                position_supplied: 1000,
                total_supplied: 1000,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "supplied");
        assert_eq!(json["sequence"], 3);

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
