use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    // Raw price samples
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS crypto_prices (
  symbol TEXT NOT NULL,
  price DOUBLE PRECISION NOT NULL,
  created_ms BIGINT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_crypto_prices_symbol_ts ON crypto_prices(symbol, created_ms);"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
