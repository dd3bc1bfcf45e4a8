pub mod client;
pub mod errors;
pub mod types;

use async_trait::async_trait;

pub use client::HttpTickSupplier;
pub use errors::FeedError;
pub use types::*;

/// Source of periodic price batches.
#[async_trait]
pub trait TickSupplier: Send + Sync {
    /// One tick per watch-list entry, in watch-list order.
    async fn fetch(&self, watchlist: &[String]) -> Result<Vec<Tick>, FeedError>;
}
