use engine::{AssetId, MarginError};
use thiserror::Error;

use crate::feed::FeedError;
use crate::persistence::PersistError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("invalid margin configuration: {0}")]
    Margin(#[from] MarginError),
}

/// Why an ingestion cycle stopped early.
#[derive(Error, Debug)]
pub enum CycleError {
    /// Nothing was applied; the next interval retries.
    #[error("tick fetch failed: {0}")]
    Fetch(#[from] FeedError),

    /// Samples before `asset` were applied and kept; the rest of the batch was skipped.
    #[error("persisting {asset} failed after {applied} samples: {source}")]
    Persist {
        asset: AssetId,
        applied: usize,
        #[source]
        source: PersistError,
    },
}
