//! Integer amount arithmetic.
//!
//! All balances, reserves and shares are unsigned integers in the asset's
//! smallest unit. Division always truncates toward zero, and every operation
//! that could overflow is checked and surfaces
//! [`LendswapError::ArithmeticOverflow`].

use crate::{LendswapError, Result, constants::BPS_SCALE};

/// Type alias for token amounts, reserves and pool shares.
pub type Amount = u128;

/// Checked addition.
pub fn add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(LendswapError::ArithmeticOverflow)
}

/// Checked subtraction. Underflow is reported as overflow: counters never
/// go negative.
pub fn sub(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_sub(b).ok_or(LendswapError::ArithmeticOverflow)
}

/// `floor(a * b / denominator)` with overflow and zero-denominator checks.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> Result<Amount> {
    if denominator == 0 {
        return Err(LendswapError::ArithmeticOverflow);
    }
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or(LendswapError::ArithmeticOverflow)
}

/// `floor(amount * bps / 10_000)`.
pub fn apply_bps(amount: Amount, bps: u32) -> Result<Amount> {
    mul_div(amount, Amount::from(bps), Amount::from(BPS_SCALE))
}

/// `floor(sqrt(a * b))`, the bootstrap share count of an empty pool.
pub fn sqrt_product(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_mul(b)
        .map(isqrt)
        .ok_or(LendswapError::ArithmeticOverflow)
}

/// Integer square root (floor).
#[must_use]
pub fn isqrt(value: Amount) -> Amount {
    value.isqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_truncates() {
        assert_eq!(mul_div(100, 9970, 10_000).unwrap(), 99);
        assert_eq!(mul_div(99, 1000, 1099).unwrap(), 90);
    }

    #[test]
    fn mul_div_rejects_zero_denominator() {
        assert!(matches!(
            mul_div(1, 1, 0),
            Err(LendswapError::ArithmeticOverflow)
        ));
    }

    #[test]
    fn mul_div_overflow_is_reported() {
        let err = mul_div(Amount::MAX, 2, 1).unwrap_err();
        assert!(matches!(err, LendswapError::ArithmeticOverflow));
    }

    #[test]
    fn sub_never_goes_negative() {
        assert_eq!(sub(5, 5).unwrap(), 0);
        assert!(sub(4, 5).is_err());
    }

    #[test]
    fn apply_bps_rounds_down() {
        assert_eq!(apply_bps(1000, 7500).unwrap(), 750);
        assert_eq!(apply_bps(1, 7500).unwrap(), 0);
        assert_eq!(apply_bps(999, 8000).unwrap(), 799);
    }

    #[test]
    fn sqrt_product_floors() {
        assert_eq!(sqrt_product(1000, 1000).unwrap(), 1000);
        assert_eq!(sqrt_product(2, 1).unwrap(), 1);
        assert_eq!(sqrt_product(10, 10).unwrap(), 10);
        assert_eq!(sqrt_product(10, 11).unwrap(), 10);
        assert!(sqrt_product(Amount::MAX, 2).is_err());
    }

    #[test]
    fn isqrt_matches_floor_for_random_values() {
        use rand::{Rng, SeedableRng, rngs::StdRng};
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let v: Amount = rng.gen_range(0..=u64::MAX as Amount);
            let r = isqrt(v);
            assert!(r * r <= v);
            assert!((r + 1) * (r + 1) > v);
        }
    }
}
