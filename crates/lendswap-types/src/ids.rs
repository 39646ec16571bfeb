//! Identifiers used throughout lendswap.
//!
//! Accounts use UUIDv7 (or a deterministic label-derived UUID), assets are
//! symbols, and pools are derived from their canonical asset pair so that
//! `(A, B)` and `(B, A)` always resolve to the same [`PoolId`].

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants;

/// First 16 bytes of a domain-separated SHA-256 digest.
fn digest_16(domain: &[u8], parts: &[&[u8]]) -> [u8; 16] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let hash = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    bytes
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Unique identifier for an account (a user, a liquidator, or an engine's
/// custody account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Deterministic id for a well-known label (custody accounts, fixtures).
    ///
    /// The same label always yields the same id on every run.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::from_bytes(digest_16(constants::ACCOUNT_ID_DOMAIN, &[label.as_bytes()]))
    }

    /// First 4 bytes as hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0.as_bytes()[..4])
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Asset symbol (e.g., "USDC", "WETH").
///
/// The empty symbol plays the role of the zero address and is rejected by
/// every registration entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the zero (empty) asset.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for AssetId {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order two assets deterministically (lexicographic by symbol).
#[must_use]
pub fn canonical_pair(a: &AssetId, b: &AssetId) -> (AssetId, AssetId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

// ---------------------------------------------------------------------------
// PoolId
// ---------------------------------------------------------------------------

/// Identifier of a constant-product pool, derived from its canonical pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PoolId(pub Uuid);

impl PoolId {
    /// Deterministic pool id for an unordered asset pair.
    ///
    /// Every caller computes the **same** id regardless of argument order.
    #[must_use]
    pub fn for_pair(a: &AssetId, b: &AssetId) -> Self {
        let (first, second) = canonical_pair(a, b);
        Self(Uuid::from_bytes(digest_16(
            constants::POOL_ID_DOMAIN,
            &[first.as_str().as_bytes(), second.as_str().as_bytes()],
        )))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool:{}", hex::encode(&self.0.as_bytes()[..8]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
