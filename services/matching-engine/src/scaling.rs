//! Decimal scaling between base and quote units
//!
//! With `D = 10^base.decimals`, a traded base amount `b` at price `p` is
//! worth `b * p / D` quote units, and a quote budget `q` buys `q * D / p`
//! base units. Division floors toward zero. Products are computed with
//! checked 128-bit multiplication; an overflow surfaces as an error
//! instead of wrapping.

use types::errors::EngineError;
use types::units::{Price, Quantity};

/// Quote units for a base amount at a price, floored.
///
/// A zero result is legal here; callers that must not trade dust use
/// [`quote_units`].
pub fn quote_units_floor(
    base: Quantity,
    price: Price,
    base_scale: u128,
) -> Result<u128, EngineError> {
    let product = base
        .as_u128()
        .checked_mul(price.as_u128())
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(product / base_scale)
}

/// Quote units for a base amount at a price, rejecting zero-truncation.
pub fn quote_units(base: Quantity, price: Price, base_scale: u128) -> Result<u128, EngineError> {
    let units = quote_units_floor(base, price, base_scale)?;
    if units == 0 {
        return Err(EngineError::QuoteAmountTooSmall);
    }
    Ok(units)
}

/// Base units purchasable with a quote budget at a price, floored.
///
/// A zero result is legal here; callers that must not trade dust use
/// [`base_units`]. `price` must be positive.
pub fn base_units_floor(
    quote: u128,
    price: Price,
    base_scale: u128,
) -> Result<u128, EngineError> {
    if price.is_zero() {
        return Err(EngineError::InvalidPrice);
    }
    let product = quote
        .checked_mul(base_scale)
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(product / price.as_u128())
}

/// Base units for a quote budget at a price, rejecting zero-truncation.
pub fn base_units(quote: u128, price: Price, base_scale: u128) -> Result<u128, EngineError> {
    let units = base_units_floor(quote, price, base_scale)?;
    if units == 0 {
        return Err(EngineError::BaseAmountTooSmall);
    }
    Ok(units)
}
