use std::collections::BTreeMap;

use crate::asset::AssetId;
use crate::error::MarginError;

/// Largest usable margin. Watermark updates add `2 × margin` to a price,
/// which must stay finite.
pub const MAX_MARGIN: f64 = f64::MAX / 4.0;

/// Per-asset alert margin: `base × scale`, scale defaulting to 1.
///
/// Validated once at construction and immutable afterwards, so resolution
/// is a pure function of the asset for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginTable {
    base: f64,
    scales: BTreeMap<AssetId, f64>,
}

impl MarginTable {
    pub fn new(
        base: f64,
        scales: impl IntoIterator<Item = (AssetId, f64)>,
    ) -> Result<Self, MarginError> {
        if !base.is_finite() || base <= 0.0 || base > MAX_MARGIN {
            return Err(MarginError::InvalidBase(base));
        }

        let mut table = BTreeMap::new();
        for (asset, scale) in scales {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(MarginError::InvalidScale { asset, scale });
            }
            let margin = base * scale;
            if margin <= 0.0 || margin > MAX_MARGIN {
                return Err(MarginError::OutOfRange { asset, margin });
            }
            table.insert(asset, scale);
        }

        Ok(Self {
            base,
            scales: table,
        })
    }

    /// Same margin for every asset.
    pub fn flat(base: f64) -> Result<Self, MarginError> {
        Self::new(base, std::iter::empty())
    }

    /// Parses `"ETH=0.1, SOL=0.01"` into scale entries. Empty input yields none.
    pub fn parse_scales(raw: &str) -> Result<Vec<(AssetId, f64)>, MarginError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| -> Result<(AssetId, f64), MarginError> {
                let (symbol, factor) = entry
                    .split_once('=')
                    .ok_or_else(|| MarginError::MalformedEntry(entry.to_string()))?;

                let symbol = symbol.trim();
                if symbol.is_empty() {
                    return Err(MarginError::MalformedEntry(entry.to_string()));
                }

                let factor: f64 = factor
                    .trim()
                    .parse()
                    .map_err(|_| MarginError::MalformedEntry(entry.to_string()))?;

                Ok((AssetId::new(symbol), factor))
            })
            .collect()
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn scale_for(&self, asset: &AssetId) -> f64 {
        self.scales.get(asset).copied().unwrap_or(1.0)
    }

    pub fn margin_for(&self, asset: &AssetId) -> f64 {
        self.base * self.scale_for(asset)
    }
}
