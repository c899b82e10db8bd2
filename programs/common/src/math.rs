//! Fixed-point helpers
//!
//! Ratios are expressed against `FULL_SCALE` (1e18 == 100%). Amounts and
//! prices are `u64`; every intermediate product is carried in `u128` and all
//! multiplications happen before the single division, which truncates.

use crate::error::SaleError;

/// Full-scale unit: the fixed-point value representing 100%
pub const FULL_SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u128 = 10_000;

/// `a * b / denominator` with a u128 intermediate, truncating toward zero
#[inline]
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, SaleError> {
    if denominator == 0 {
        return Err(SaleError::InvalidInput);
    }
    let product = a.checked_mul(b).ok_or(SaleError::Overflow)?;
    Ok(product / denominator)
}

/// Checked add that reports overflow as a sale error
#[inline]
pub fn add_checked(a: u128, b: u128) -> Result<u128, SaleError> {
    a.checked_add(b).ok_or(SaleError::Overflow)
}

/// Narrow a u128 result back to the u64 amount/price domain
#[inline]
pub fn to_u64(value: u128) -> Result<u64, SaleError> {
    u64::try_from(value).map_err(|_| SaleError::Overflow)
}

/// Convert a basis-point fraction to the full-scale fixed-point domain
#[inline]
pub fn bps_to_full_scale(bps: u64) -> Result<u128, SaleError> {
    mul_div(bps as u128, FULL_SCALE, BPS_SCALE)
}

/// Convert whole units to atomic units using the asset's unit scale
#[inline]
pub fn whole_to_atomic(whole_units: u64, unit_scale: u64) -> Result<u64, SaleError> {
    whole_units
        .checked_mul(unit_scale)
        .ok_or(SaleError::Overflow)
}
