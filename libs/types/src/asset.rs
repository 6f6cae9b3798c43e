//! Asset descriptors
//!
//! An asset pairs an opaque identifier with the decimal precision of its
//! smallest unit. All engine amounts are denominated in smallest units.

use crate::ids::AssetId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest supported decimal precision: 10^38 still fits in a u128.
pub const MAX_DECIMALS: u8 = 38;

/// An asset with its decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub decimals: u8,
}

impl Asset {
    /// Create a new asset descriptor.
    ///
    /// # Panics
    /// Panics if `decimals` exceeds [`MAX_DECIMALS`].
    pub fn new(id: AssetId, decimals: u8) -> Self {
        assert!(decimals <= MAX_DECIMALS, "decimals exceed u128 range");
        Self { id, decimals }
    }

    /// Try to create an asset descriptor, returning None if the precision
    /// is out of range.
    pub fn try_new(id: AssetId, decimals: u8) -> Option<Self> {
        (decimals <= MAX_DECIMALS).then_some(Self { id, decimals })
    }

    /// Number of smallest units per whole unit: 10^decimals.
    pub fn unit_scale(&self) -> u128 {
        10u128.pow(self.decimals as u32)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.decimals)
    }
}
