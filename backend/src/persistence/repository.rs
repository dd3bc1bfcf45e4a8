use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine::AssetId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Append-only store for raw price samples.
#[async_trait]
pub trait SampleRepository: Send + Sync {
    async fn append_sample(
        &self,
        asset: &AssetId,
        price: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<(), PersistError>;
}
