//! Error taxonomy for the matching engine workspace
//!
//! Stable, non-overlapping error kinds using thiserror. Every public
//! operation fails by returning a variant; escrow and state mutations of
//! the failing operation are rolled back by the caller contract.

use crate::ids::{AccountId, AssetId, OrderId};
use crate::units::Quantity;
use thiserror::Error;

/// Errors returned by matching engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("price must be positive")]
    InvalidPrice,

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("batch of {len} exceeds the limit of {max}")]
    BatchSizeTooLarge { len: usize, max: usize },

    #[error("prices and amounts must be non-empty and of equal length")]
    InvalidInput,

    #[error("quote value truncates to zero")]
    QuoteAmountTooSmall,

    #[error("base value truncates to zero")]
    BaseAmountTooSmall,

    #[error("caller is not the trader of order {order_id}")]
    Unauthorized { order_id: OrderId },

    #[error("order {order_id} is already filled or cancelled")]
    OrderInactive { order_id: OrderId },

    #[error("new amount {new_amount} does not exceed filled {filled}")]
    AmountLessThanFilled {
        new_amount: Quantity,
        filled: Quantity,
    },

    #[error("order expired at {expiration}")]
    OrderExpired { expiration: i64 },

    #[error("no price hints provided")]
    NoPricesProvided,

    #[error("received {received} base units, required {min_received}")]
    InsufficientBaseReceived { received: u128, min_received: u128 },

    #[error("received {received} quote units, required {min_received}")]
    InsufficientQuoteReceived { received: u128, min_received: u128 },

    #[error("order {order_id} was never assigned")]
    UnknownOrder { order_id: OrderId },

    #[error("unit conversion overflowed 128 bits")]
    ArithmeticOverflow,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors returned by the Ledger abstraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance of {asset} for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        asset: AssetId,
        required: u128,
        available: u128,
    },

    #[error("insufficient custody of {asset}: required {required}, available {available}")]
    InsufficientCustody {
        asset: AssetId,
        required: u128,
        available: u128,
    },

    #[error("asset {asset} is not registered")]
    UnknownAsset { asset: AssetId },

    #[error("unit amount must be positive")]
    InvalidUnits,

    #[error("balance overflow for {asset}")]
    BalanceOverflow { asset: AssetId },
}

/// Errors returned by the pair registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("base and quote tokens are identical")]
    IdenticalTokens,

    #[error("base token identifier is invalid")]
    InvalidBaseToken,

    #[error("quote token identifier is invalid")]
    InvalidQuoteToken,

    #[error("pair already exists")]
    PoolAlreadyExists,

    #[error("quote token {asset} is not whitelisted")]
    QuoteTokenNotWhitelisted { asset: AssetId },

    #[error("quote token {asset} is already whitelisted")]
    QuoteTokenAlreadyWhitelisted { asset: AssetId },

    #[error("pair index {index} out of range ({len} pairs)")]
    PairIndexOutOfRange { index: usize, len: usize },
}
