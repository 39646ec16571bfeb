//! Constant-product pricing and share arithmetic.
//!
//! All functions are pure and floor every division, so rounding always
//! favors the pool.

use lendswap_types::amount::{self, Amount};
use lendswap_types::{LendswapError, Result};

/// Output for `amount_in` against `(reserve_in, reserve_out)` after the fee.
///
/// ```text
/// in_with_fee = amount_in * fee_multiplier_bps / 10_000
/// amount_out  = in_with_fee * reserve_out / (reserve_in + in_with_fee)
/// ```
///
/// Zero when either reserve is empty.
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_multiplier_bps: u32,
) -> Result<Amount> {
    if reserve_in == 0 || reserve_out == 0 {
        return Ok(0);
    }
    let in_with_fee = amount::apply_bps(amount_in, fee_multiplier_bps)?;
    let denominator = amount::add(reserve_in, in_with_fee)?;
    amount::mul_div(in_with_fee, reserve_out, denominator)
}

/// Amount of B matching `amount_a` at the current ratio.
///
/// # Errors
/// `InsufficientLiquidity` when `reserve_a` is zero.
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount> {
    if reserve_a == 0 {
        return Err(LendswapError::InsufficientLiquidity);
    }
    amount::mul_div(amount_a, reserve_b, reserve_a)
}

/// Deposit pair for a non-empty pool, bounded by the desired amounts and
/// checked against the minimums.
pub fn optimal_amounts(
    reserve_a: Amount,
    reserve_b: Amount,
    a_desired: Amount,
    b_desired: Amount,
    a_min: Amount,
    b_min: Amount,
) -> Result<(Amount, Amount)> {
    let b_optimal = quote(a_desired, reserve_a, reserve_b)?;
    if b_optimal <= b_desired {
        if b_optimal < b_min {
            return Err(LendswapError::InsufficientTokenB {
                amount: b_optimal,
                minimum: b_min,
            });
        }
        return Ok((a_desired, b_optimal));
    }

    // b_optimal > b_desired implies a_optimal <= a_desired.
    let a_optimal = quote(b_desired, reserve_b, reserve_a)?;
    if a_optimal < a_min {
        return Err(LendswapError::InsufficientTokenA {
            amount: a_optimal,
            minimum: a_min,
        });
    }
    Ok((a_optimal, b_desired))
}

/// Shares minted for depositing `(amount_a, amount_b)`.
///
/// Bootstrap: `floor(sqrt(a * b))`. Otherwise the smaller of the two
/// pro-rata ratios, so an unbalanced deposit donates the excess.
pub fn shares_to_mint(
    amount_a: Amount,
    amount_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
    total_shares: Amount,
) -> Result<Amount> {
    if total_shares == 0 {
        return amount::sqrt_product(amount_a, amount_b);
    }
    let by_a = amount::mul_div(amount_a, total_shares, reserve_a)?;
    let by_b = amount::mul_div(amount_b, total_shares, reserve_b)?;
    Ok(by_a.min(by_b))
}

/// `floor(liquidity * reserve / total_shares)`.
pub fn pro_rata(liquidity: Amount, reserve: Amount, total_shares: Amount) -> Result<Amount> {
    if total_shares == 0 {
        return Err(LendswapError::InsufficientLiquidity);
    }
    amount::mul_div(liquidity, reserve, total_shares)
}
