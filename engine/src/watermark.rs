use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::asset::AssetId;

/// Trailing reference points for one asset.
///
/// `high >= low` holds for every state the engine reaches from a fresh
/// entry, but nothing enforces it: a state written through
/// [`WatermarkStore::put`] is taken as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatermarkState {
    pub high: f64,
    pub low: f64,
}

impl WatermarkState {
    pub fn at(price: f64) -> Self {
        Self {
            high: price,
            low: price,
        }
    }

    pub fn band(&self) -> f64 {
        self.high - self.low
    }
}

/// Process-lifetime map of asset -> watermark state.
///
/// Owned by a single engine; not persisted and not synchronized. Callers that
/// process assets concurrently must give each asset a single owner.
#[derive(Debug, Default, Clone)]
pub struct WatermarkStore {
    states: HashMap<AssetId, WatermarkState>,
}

impl WatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state for `asset`, creating `{high: price, low: price}` on first sight.
    pub fn get_or_init(&mut self, asset: &AssetId, price: f64) -> WatermarkState {
        *self
            .states
            .entry(asset.clone())
            .or_insert_with(|| WatermarkState::at(price))
    }

    pub fn put(&mut self, asset: AssetId, state: WatermarkState) {
        self.states.insert(asset, state);
    }

    pub fn get(&self, asset: &AssetId) -> Option<WatermarkState> {
        self.states.get(asset).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &WatermarkState)> {
        self.states.iter()
    }
}
