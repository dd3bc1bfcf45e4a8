use thiserror::Error;

use crate::asset::AssetId;

/// A sample the engine refuses to evaluate. Raised before any state mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidSampleError {
    #[error("no price reported for {asset}")]
    Missing { asset: AssetId },

    #[error("non-finite price for {asset}: {price}")]
    NonFinite { asset: AssetId, price: f64 },

    #[error("non-positive price for {asset}: {price}")]
    NonPositive { asset: AssetId, price: f64 },
}

impl InvalidSampleError {
    pub fn asset(&self) -> &AssetId {
        match self {
            InvalidSampleError::Missing { asset }
            | InvalidSampleError::NonFinite { asset, .. }
            | InvalidSampleError::NonPositive { asset, .. } => asset,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarginError {
    #[error("base margin must be finite and positive, got {0}")]
    InvalidBase(f64),

    #[error("margin scale for {asset} must be finite and positive, got {scale}")]
    InvalidScale { asset: AssetId, scale: f64 },

    #[error("margin for {asset} is out of range: {margin}")]
    OutOfRange { asset: AssetId, margin: f64 },

    #[error("malformed margin scale entry `{0}` (expected SYMBOL=FACTOR)")]
    MalformedEntry(String),
}
