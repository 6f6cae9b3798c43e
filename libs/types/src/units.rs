//! Exact unsigned-integer unit types
//!
//! Prices are quote-smallest-units per whole base unit; quantities are
//! base-smallest-units. Both are u128 newtypes with checked arithmetic.
//! No floating point anywhere; serialized as strings to prevent JSON
//! number precision loss.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in quote-smallest-units per one whole base unit.
///
/// A resting order's price must be positive; the zero price only appears
/// as the pre-trade `last_trade_price` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u128);

impl Price {
    /// The pre-trade sentinel.
    pub const ZERO: Price = Price(0);

    /// Wrap a raw price value.
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    /// Try to create a strictly positive price.
    pub fn try_new(value: u128) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Check if this is the zero sentinel
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Get the raw value
    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// String serde to preserve precision
impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value: u128 = s.parse().map_err(serde::de::Error::custom)?;
        Ok(Self(value))
    }
}

/// Quantity in base-smallest-units.
///
/// Zero is a legal value (a fresh order's `filled` starts at zero), so
/// positivity checks live at the operation boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(u128);

impl Quantity {
    /// The zero quantity.
    pub const ZERO: Quantity = Quantity(0);

    /// Wrap a raw quantity value.
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    /// Check if the quantity is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Get the raw value
    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Checked addition
    pub fn checked_add(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_add(rhs.0).map(Quantity)
    }

    /// Checked subtraction
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_sub(rhs.0).map(Quantity)
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0.saturating_sub(rhs.0))
    }

    /// The smaller of two quantities
    pub fn min(self, rhs: Quantity) -> Quantity {
        Quantity(self.0.min(rhs.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// String serde to preserve precision
impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value: u128 = s.parse().map_err(serde::de::Error::custom)?;
        Ok(Self(value))
    }
}
