//! Ledger abstraction and in-memory implementation
//!
//! The engine never holds balances itself: placement escrow moves units
//! from the trader into engine custody via `debit`, and fills, refunds,
//! and cancels release custody via `credit`. Any transfer medium that
//! honors exact integer semantics can sit behind the trait.

use dashmap::DashMap;
use std::sync::Arc;
use types::errors::LedgerError;
use types::ids::{AccountId, AssetId};

/// The asset-transfer medium required by the engine.
///
/// Units are unsigned integers in the asset's smallest denomination.
/// Methods take `&self`; implementations use interior mutability so one
/// ledger can serve many engines.
pub trait Ledger {
    /// Move `units` of `asset` from `account` into engine custody.
    ///
    /// Fails if the account's balance is insufficient.
    fn debit(&self, account: AccountId, asset: AssetId, units: u128) -> Result<(), LedgerError>;

    /// Move `units` of `asset` from engine custody to `account`.
    ///
    /// Infallible under well-formed inputs.
    fn credit(&self, account: AccountId, asset: AssetId, units: u128) -> Result<(), LedgerError>;

    /// Decimal precision of an asset's smallest unit.
    fn decimals(&self, asset: AssetId) -> Result<u8, LedgerError>;
}

impl<L: Ledger> Ledger for Arc<L> {
    fn debit(&self, account: AccountId, asset: AssetId, units: u128) -> Result<(), LedgerError> {
        (**self).debit(account, asset, units)
    }

    fn credit(&self, account: AccountId, asset: AssetId, units: u128) -> Result<(), LedgerError> {
        (**self).credit(account, asset, units)
    }

    fn decimals(&self, asset: AssetId) -> Result<u8, LedgerError> {
        (**self).decimals(asset)
    }
}

/// In-memory ledger with custody tracking.
///
/// Balances are keyed by (account, asset); custody is a per-asset pool
/// owned by the engines. A `deposit` faucet funds accounts for tests and
/// simulations.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: DashMap<(AccountId, AssetId), u128>,
    custody: DashMap<AssetId, u128>,
    assets: DashMap<AssetId, u8>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset's decimal precision.
    pub fn register_asset(&self, asset: AssetId, decimals: u8) {
        self.assets.insert(asset, decimals);
    }

    /// Credit freshly minted units to an account.
    pub fn deposit(
        &self,
        account: AccountId,
        asset: AssetId,
        units: u128,
    ) -> Result<(), LedgerError> {
        if units == 0 {
            return Err(LedgerError::InvalidUnits);
        }
        self.require_asset(asset)?;
        let mut balance = self.balances.entry((account, asset)).or_insert(0);
        *balance = balance
            .checked_add(units)
            .ok_or(LedgerError::BalanceOverflow { asset })?;
        Ok(())
    }

    /// Current balance of an account for an asset
    pub fn balance_of(&self, account: AccountId, asset: AssetId) -> u128 {
        self.balances
            .get(&(account, asset))
            .map(|units| *units)
            .unwrap_or(0)
    }

    /// Units of an asset currently held in engine custody
    pub fn custody_of(&self, asset: AssetId) -> u128 {
        self.custody.get(&asset).map(|units| *units).unwrap_or(0)
    }

    fn require_asset(&self, asset: AssetId) -> Result<(), LedgerError> {
        if self.assets.contains_key(&asset) {
            Ok(())
        } else {
            Err(LedgerError::UnknownAsset { asset })
        }
    }
}

impl Ledger for InMemoryLedger {
    fn debit(&self, account: AccountId, asset: AssetId, units: u128) -> Result<(), LedgerError> {
        if units == 0 {
            return Err(LedgerError::InvalidUnits);
        }
        self.require_asset(asset)?;

        let mut balance = self.balances.entry((account, asset)).or_insert(0);
        if *balance < units {
            return Err(LedgerError::InsufficientBalance {
                account,
                asset,
                required: units,
                available: *balance,
            });
        }
        *balance -= units;
        drop(balance);

        let mut custody = self.custody.entry(asset).or_insert(0);
        *custody = custody
            .checked_add(units)
            .ok_or(LedgerError::BalanceOverflow { asset })?;
        Ok(())
    }

    fn credit(&self, account: AccountId, asset: AssetId, units: u128) -> Result<(), LedgerError> {
        if units == 0 {
            return Err(LedgerError::InvalidUnits);
        }
        self.require_asset(asset)?;

        let mut custody = self.custody.entry(asset).or_insert(0);
        if *custody < units {
            return Err(LedgerError::InsufficientCustody {
                asset,
                required: units,
                available: *custody,
            });
        }
        *custody -= units;
        drop(custody);

        let mut balance = self.balances.entry((account, asset)).or_insert(0);
        *balance = balance
            .checked_add(units)
            .ok_or(LedgerError::BalanceOverflow { asset })?;
        Ok(())
    }

    fn decimals(&self, asset: AssetId) -> Result<u8, LedgerError> {
        self.assets
            .get(&asset)
            .map(|decimals| *decimals)
            .ok_or(LedgerError::UnknownAsset { asset })
    }
}
