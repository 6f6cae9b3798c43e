//! Pair registry
//!
//! Creates and indexes one matching engine per (base, quote) pair.
//! Uniqueness is keyed by a canonical hash over the sorted asset ids, so
//! (A, B) and (B, A) name the same pair; the engine itself keeps the
//! caller-supplied role ordering. Quote assets must be whitelisted.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::info;
use types::asset::Asset;
use types::errors::RegistryError;
use types::ids::AssetId;

use crate::engine::MatchingEngine;
use crate::events::{PairCreated, QuoteTokenAdded, RegistryEvent};
use crate::ledger::Ledger;

/// Shared handle to one pair's engine.
///
/// The mutex serializes every operation on the engine; distinct pairs
/// run fully in parallel.
pub type PairHandle<L> = Arc<Mutex<MatchingEngine<L>>>;

/// Canonical 32-byte key of an unordered asset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey([u8; 32]);

impl PairKey {
    /// Hash the lexicographically sorted pair of asset ids.
    pub fn of(a: AssetId, b: AssetId) -> Self {
        let (lo, hi) = if a.as_bytes() <= b.as_bytes() {
            (a, b)
        } else {
            (b, a)
        };
        let mut hasher = Sha256::new();
        hasher.update(lo.as_bytes());
        hasher.update(hi.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Factory and index of trading pairs.
pub struct PairRegistry<L: Ledger + Clone> {
    whitelist: HashSet<AssetId>,
    pairs: HashMap<PairKey, PairHandle<L>>,
    /// Insertion-ordered handles for enumeration
    list: Vec<PairHandle<L>>,
    ledger: L,
    /// Emitted events log (append-only)
    events: Vec<RegistryEvent>,
}

impl<L: Ledger + Clone> PairRegistry<L> {
    /// Create a registry whose engines share the given ledger.
    pub fn new(ledger: L) -> Self {
        Self {
            whitelist: HashSet::new(),
            pairs: HashMap::new(),
            list: Vec::new(),
            ledger,
            events: Vec::new(),
        }
    }

    /// Whitelist a quote asset.
    ///
    /// Whitelist governance is a policy concern outside the engine; the
    /// call is deliberately ungated here.
    pub fn add_quote(&mut self, asset: AssetId) -> Result<(), RegistryError> {
        if asset.is_zero() {
            return Err(RegistryError::InvalidQuoteToken);
        }
        if !self.whitelist.insert(asset) {
            return Err(RegistryError::QuoteTokenAlreadyWhitelisted { asset });
        }
        self.events
            .push(RegistryEvent::QuoteTokenAdded(QuoteTokenAdded { asset }));
        info!(%asset, "quote token whitelisted");
        Ok(())
    }

    /// Check whether a quote asset is whitelisted
    pub fn is_quote_whitelisted(&self, asset: AssetId) -> bool {
        self.whitelist.contains(&asset)
    }

    /// Create the engine for a new pair.
    ///
    /// The canonical key only enforces uniqueness; the engine keeps the
    /// caller-supplied base/quote roles.
    pub fn create(&mut self, base: Asset, quote: Asset) -> Result<PairHandle<L>, RegistryError> {
        if base.id.is_zero() {
            return Err(RegistryError::InvalidBaseToken);
        }
        if quote.id.is_zero() {
            return Err(RegistryError::InvalidQuoteToken);
        }
        if base.id == quote.id {
            return Err(RegistryError::IdenticalTokens);
        }
        if !self.whitelist.contains(&quote.id) {
            return Err(RegistryError::QuoteTokenNotWhitelisted { asset: quote.id });
        }
        let key = PairKey::of(base.id, quote.id);
        if self.pairs.contains_key(&key) {
            return Err(RegistryError::PoolAlreadyExists);
        }

        let engine = MatchingEngine::new(base, quote, self.ledger.clone());
        let handle: PairHandle<L> = Arc::new(Mutex::new(engine));
        self.pairs.insert(key, Arc::clone(&handle));
        self.list.push(Arc::clone(&handle));
        self.events.push(RegistryEvent::PairCreated(PairCreated {
            key: *key.as_bytes(),
            base,
            quote,
        }));
        info!(base = %base.id, quote = %quote.id, "pair created");
        Ok(handle)
    }

    /// Number of registered pairs
    pub fn count(&self) -> usize {
        self.list.len()
    }

    /// Pair handle by creation index
    pub fn by_index(&self, index: usize) -> Result<PairHandle<L>, RegistryError> {
        self.list
            .get(index)
            .cloned()
            .ok_or(RegistryError::PairIndexOutOfRange {
                index,
                len: self.list.len(),
            })
    }

    /// All pair handles in creation order
    pub fn all(&self) -> Vec<PairHandle<L>> {
        self.list.clone()
    }

    /// Look up a pair by its two asset ids, in either order
    pub fn get(&self, a: AssetId, b: AssetId) -> Option<PairHandle<L>> {
        self.pairs.get(&PairKey::of(a, b)).cloned()
    }

    /// Events emitted so far
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Take and clear the event log
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }
}
