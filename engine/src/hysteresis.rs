use tracing::{debug, trace};

use crate::alert::{AlertEvent, Direction};
use crate::asset::PriceSample;
use crate::error::InvalidSampleError;
use crate::margin::MarginTable;
use crate::watermark::{WatermarkState, WatermarkStore};

/// Result of feeding one sample to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// State written back to the store.
    pub state: WatermarkState,
    /// DUMP before PUMP when both fire on the same sample.
    pub alerts: Vec<AlertEvent>,
}

/// Watermark crossing found by one phase: (reference, threshold).
type Trigger = (f64, f64);

/// Per-asset trailing hysteresis state machine.
///
/// Each engine owns its own [`WatermarkStore`], so independent instances
/// (tests, shards) never see each other's state.
#[derive(Debug, Clone)]
pub struct HysteresisEngine {
    margins: MarginTable,
    store: WatermarkStore,
}

impl HysteresisEngine {
    pub fn new(margins: MarginTable) -> Self {
        Self::with_store(margins, WatermarkStore::new())
    }

    /// Starts from pre-populated watermarks.
    pub fn with_store(margins: MarginTable, store: WatermarkStore) -> Self {
        Self { margins, store }
    }

    pub fn margins(&self) -> &MarginTable {
        &self.margins
    }

    pub fn store(&self) -> &WatermarkStore {
        &self.store
    }

    /// Applies one sample to its asset's watermarks.
    ///
    /// Logic:
    /// 1. Reject non-finite / non-positive prices before touching state.
    /// 2. Load (or lazily create) the asset's watermark state.
    /// 3. Rising phase: follow new highs, drag the low up to `high - 2·margin`,
    ///    fire DUMP when price sits below `high - margin`, then reset high.
    /// 4. Falling phase: mirror image against the low, firing PUMP.
    /// 5. Write the state back.
    ///
    /// Both phases always run, in that order, and the falling phase sees the
    /// rising phase's mutations.
    pub fn observe(&mut self, sample: &PriceSample) -> Result<Observation, InvalidSampleError> {
        sample.validate()?;

        let price = sample.price;
        let margin = self.margins.margin_for(&sample.asset);
        let mut state = self.store.get_or_init(&sample.asset, price);
        let mut alerts = Vec::new();

        if let Some((reference, threshold)) = rising_phase(&mut state, price, margin) {
            debug!(asset = %sample.asset, price, reference, threshold, "dump detected; high watermark reset");
            alerts.push(AlertEvent::from_sample(
                sample,
                Direction::Dump,
                reference,
                threshold,
            ));
        }

        if let Some((reference, threshold)) = falling_phase(&mut state, price, margin) {
            debug!(asset = %sample.asset, price, reference, threshold, "pump detected; low watermark reset");
            alerts.push(AlertEvent::from_sample(
                sample,
                Direction::Pump,
                reference,
                threshold,
            ));
        }

        trace!(
            asset = %sample.asset,
            price,
            margin,
            high = state.high,
            low = state.low,
            alerts = alerts.len(),
            "watermarks updated"
        );

        self.store.put(sample.asset.clone(), state);

        Ok(Observation { state, alerts })
    }
}

fn rising_phase(state: &mut WatermarkState, price: f64, margin: f64) -> Option<Trigger> {
    if price > state.high {
        state.high = price;
        // A strong new high pulls a stale low up with it.
        if state.high - 2.0 * margin > state.low {
            state.low = state.high - 2.0 * margin;
        }
    }

    let threshold = state.high - margin;
    if price < threshold {
        let reference = state.high;
        state.high = price;
        return Some((reference, threshold));
    }

    None
}

fn falling_phase(state: &mut WatermarkState, price: f64, margin: f64) -> Option<Trigger> {
    if price < state.low {
        state.low = price;
        if state.low + 2.0 * margin < state.high {
            state.high = state.low + 2.0 * margin;
        }
    }

    let threshold = state.low + margin;
    if price > threshold {
        let reference = state.low;
        state.low = price;
        return Some((reference, threshold));
    }

    None
}
