use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::{AssetId, PriceSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Price bounced up by more than the margin from the low watermark.
    Pump,
    /// Price fell by more than the margin from the high watermark.
    Dump,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Pump => "PUMP/MOON",
            Direction::Dump => "DUMP/CRASH",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Pump => f.write_str("PUMP"),
            Direction::Dump => f.write_str("DUMP"),
        }
    }
}

/// Produced by the engine, consumed once by a notifier. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub asset: AssetId,
    pub direction: Direction,
    pub current_price: f64,
    /// Watermark the move is measured from (high for DUMP, low for PUMP).
    pub reference_price: f64,
    pub trigger_threshold: f64,
    pub observed_at: DateTime<Utc>,
}

impl AlertEvent {
    pub(crate) fn from_sample(
        sample: &PriceSample,
        direction: Direction,
        reference_price: f64,
        trigger_threshold: f64,
    ) -> Self {
        Self {
            asset: sample.asset.clone(),
            direction,
            current_price: sample.price,
            reference_price,
            trigger_threshold,
            observed_at: sample.observed_at,
        }
    }

    pub fn diff(&self) -> f64 {
        (self.current_price - self.reference_price).abs()
    }
}
