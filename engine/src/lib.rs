//! Trailing hysteresis alert engine.
//!
//! Tracks a high/low watermark per asset and turns a stream of price samples
//! into PUMP/DUMP alert events. The crate is synchronous and does no I/O; the
//! service layer owns fetching, persistence and delivery.

pub mod alert;
pub mod asset;
pub mod error;
pub mod hysteresis;
pub mod margin;
pub mod watermark;

pub use alert::{AlertEvent, Direction};
pub use asset::{AssetId, PriceSample};
pub use error::{InvalidSampleError, MarginError};
pub use hysteresis::{HysteresisEngine, Observation};
pub use margin::{MAX_MARGIN, MarginTable};
pub use watermark::{WatermarkState, WatermarkStore};
