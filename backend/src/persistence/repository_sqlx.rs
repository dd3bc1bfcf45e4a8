use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine::AssetId;
use sqlx::AnyPool;

use crate::persistence::repository::{PersistError, SampleRepository};

/// SQLx-backed implementation of SampleRepository.
/// Writes one row per sample into `crypto_prices`.
pub struct SqlxSampleRepository {
    pool: AnyPool,
}

impl SqlxSampleRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SampleRepository for SqlxSampleRepository {
    async fn append_sample(
        &self,
        asset: &AssetId,
        price: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<(), PersistError> {
        // `$n` placeholders are understood by both sqlite and postgres.
        sqlx::query(
            r#"
INSERT INTO crypto_prices (symbol, price, created_ms)
VALUES ($1, $2, $3);
"#,
        )
        .bind(asset.as_str().to_string())
        .bind(price)
        .bind(observed_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
