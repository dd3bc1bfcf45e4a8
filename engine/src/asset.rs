use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidSampleError;

/// Ticker-style asset key. Always stored trimmed and upper-cased so that
/// `"eth"`, `" ETH "` and `"ETH"` address the same watermark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One observed price for one asset. The only input the engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub asset: AssetId,
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

impl PriceSample {
    pub fn new(asset: AssetId, price: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            asset,
            price,
            observed_at,
        }
    }

    /// Builds a sample from a feed value that may be absent, validating it.
    pub fn from_feed(
        asset: AssetId,
        price: Option<f64>,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, InvalidSampleError> {
        let Some(price) = price else {
            return Err(InvalidSampleError::Missing { asset });
        };

        let sample = Self::new(asset, price, observed_at);
        sample.validate()?;
        Ok(sample)
    }

    pub fn validate(&self) -> Result<(), InvalidSampleError> {
        if !self.price.is_finite() {
            return Err(InvalidSampleError::NonFinite {
                asset: self.asset.clone(),
                price: self.price,
            });
        }
        if self.price <= 0.0 {
            return Err(InvalidSampleError::NonPositive {
                asset: self.asset.clone(),
                price: self.price,
            });
        }
        Ok(())
    }
}
