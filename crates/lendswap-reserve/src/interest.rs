//! Utilization-driven rate recomputation.
//!
//! Rates follow a single linear curve:
//!
//! ```text
//! utilization = total_borrowed * 10_000 / total_supplied
//! borrow_rate = base + utilization * slope / 10_000
//! supply_rate = borrow_rate * utilization / 10_000
//! ```
//!
//! Only rates and the timestamp move. Principal is never capitalized.

use lendswap_types::constants::BPS_SCALE;
use lendswap_types::{Amount, ReserveConfig, ReserveState};

/// Recompute `state`'s rates as of `now`.
///
/// Returns the input unchanged when no time has passed or nothing is
/// supplied (the timestamp is left alone in both cases). Utilization above
/// 100% is honored as-is; rates saturate at `u32::MAX`.
#[must_use]
pub fn accrue(state: &ReserveState, now: u64, config: &ReserveConfig) -> ReserveState {
    let mut next = state.clone();
    let elapsed = now.saturating_sub(state.last_update_timestamp);
    if elapsed == 0 || state.total_supplied == 0 {
        return next;
    }

    let utilization = state.utilization_bps();
    let scale = Amount::from(BPS_SCALE);
    let borrow_rate = Amount::from(config.base_borrow_rate_bps).saturating_add(
        utilization.saturating_mul(Amount::from(config.borrow_rate_slope_bps)) / scale,
    );
    let supply_rate = borrow_rate.saturating_mul(utilization) / scale;

    next.borrow_rate_bps = saturate(borrow_rate);
    next.supply_rate_bps = saturate(supply_rate);
    next.last_update_timestamp = now;

    tracing::debug!(
        asset = %state.asset,
        elapsed,
        utilization_bps = %utilization,
        borrow_rate_bps = next.borrow_rate_bps,
        supply_rate_bps = next.supply_rate_bps,
        "Rates recomputed"
    );
    next
}

fn saturate(rate: Amount) -> u32 {
    u32::try_from(rate).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use lendswap_types::AssetId;

    use super::*;

    fn reserve(supplied: Amount, borrowed: Amount, last: u64) -> ReserveState {
        let mut r = ReserveState::new(AssetId::from("X"), 7500, 200, 400, last);
        r.total_supplied = supplied;
        r.total_borrowed = borrowed;
        r
    }

    #[test]
    fn half_utilization() {
        let config = ReserveConfig::default();
        let next = accrue(&reserve(1000, 500, 10), 20, &config);
        // 400 + 5000 * 2000 / 10000 = 1400; 1400 * 5000 / 10000 = 700
        assert_eq!(next.borrow_rate_bps, 1400);
        assert_eq!(next.supply_rate_bps, 700);
        assert_eq!(next.last_update_timestamp, 20);
        assert_eq!(next.total_supplied, 1000);
        assert_eq!(next.total_borrowed, 500);
    }

    #[test]
    fn zero_utilization_keeps_base_borrow_rate() {
        let config = ReserveConfig::default();
        let next = accrue(&reserve(1000, 0, 0), 1, &config);
        assert_eq!(next.borrow_rate_bps, 400);
        assert_eq!(next.supply_rate_bps, 0);
    }

    #[test]
    fn same_timestamp_is_a_no_op() {
        let config = ReserveConfig::default();
        let before = reserve(1000, 500, 10);
        assert_eq!(accrue(&before, 10, &config), before);
    }

    #[test]
    fn empty_reserve_keeps_timestamp() {
        let config = ReserveConfig::default();
        let before = reserve(0, 0, 10);
        let next = accrue(&before, 99, &config);
        assert_eq!(next, before);
        assert_eq!(next.supply_rate_bps, 200);
    }

    #[test]
    fn clock_going_backwards_is_ignored() {
        let config = ReserveConfig::default();
        let before = reserve(1000, 500, 10);
        assert_eq!(accrue(&before, 5, &config), before);
    }

    #[test]
    fn over_full_utilization_is_not_capped() {
        let config = ReserveConfig::default();
        let next = accrue(&reserve(100, 200, 0), 1, &config);
        // utilization 20000: 400 + 4000 = 4400; 4400 * 2 = 8800
        assert_eq!(next.borrow_rate_bps, 4400);
        assert_eq!(next.supply_rate_bps, 8800);
    }

    #[test]
    fn custom_curve() {
        let config = ReserveConfig {
            base_borrow_rate_bps: 100,
            borrow_rate_slope_bps: 1000,
            ..ReserveConfig::default()
        };
        let next = accrue(&reserve(1000, 1000, 0), 1, &config);
        assert_eq!(next.borrow_rate_bps, 1100);
        assert_eq!(next.supply_rate_bps, 1100);
    }
}
