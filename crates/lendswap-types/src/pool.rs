//! Constant-product pool state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, PoolId, canonical_pair};

/// A two-asset pool. `asset_a < asset_b` by the canonical ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    pub total_shares: Amount,
    pub active: bool,
    /// Outstanding shares per liquidity provider.
    pub share_balances: HashMap<AccountId, Amount>,
}

impl Pool {
    /// An empty, active pool for the canonicalized pair.
    #[must_use]
    pub fn new(a: &AssetId, b: &AssetId) -> Self {
        let (asset_a, asset_b) = canonical_pair(a, b);
        Self {
            id: PoolId::for_pair(&asset_a, &asset_b),
            asset_a,
            asset_b,
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            active: true,
            share_balances: HashMap::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    /// `(reserve_in, reserve_out)` for a swap entering with `token_in`, or
    /// `None` if the token is not in this pool.
    #[must_use]
    pub fn reserves_for(&self, token_in: &AssetId) -> Option<(Amount, Amount)> {
        if *token_in == self.asset_a {
            Some((self.reserve_a, self.reserve_b))
        } else if *token_in == self.asset_b {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    /// The asset on the other side of `token_in`.
    #[must_use]
    pub fn counter_asset(&self, token_in: &AssetId) -> Option<&AssetId> {
        if *token_in == self.asset_a {
            Some(&self.asset_b)
        } else if *token_in == self.asset_b {
            Some(&self.asset_a)
        } else {
            None
        }
    }

    #[must_use]
    pub fn share_balance(&self, account: &AccountId) -> Amount {
        self.share_balances.get(account).copied().unwrap_or(0)
    }

    /// `total_shares == 0 ⇔ reserve_a == 0 ⇔ reserve_b == 0`.
    #[must_use]
    pub fn emptiness_is_consistent(&self) -> bool {
        (self.total_shares == 0) == (self.reserve_a == 0)
            && (self.reserve_a == 0) == (self.reserve_b == 0)
    }
}
