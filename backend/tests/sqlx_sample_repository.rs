use chrono::{TimeZone, Utc};
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row};
use uuid::Uuid;

use engine::AssetId;
use sentinel::db::schema::migrate;
use sentinel::persistence::{SampleRepository, SqlxSampleRepository};

/// Helper to setup an isolated, unique in-memory SQLite database.
/// Using a unique name in the connection string prevents interference during
/// parallel test execution while still allowing shared cache access.
async fn setup_db() -> AnyPool {
    sqlx::any::install_default_drivers();

    let db_name = Uuid::new_v4().to_string();
    let conn_str = format!("sqlite:file:{}?mode=memory&cache=shared", db_name);

    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .connect(&conn_str)
        .await
        .unwrap();

    migrate(&pool).await.unwrap();
    pool
}

#[tokio::test]
async fn append_sample_writes_row() {
    let pool = setup_db().await;
    let repo = SqlxSampleRepository::new(pool.clone());

    let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    repo.append_sample(&AssetId::new("btc"), 64_123.45, ts)
        .await
        .unwrap();

    let row = sqlx::query("SELECT symbol, price, created_ms FROM crypto_prices")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(row.get::<String, _>("symbol"), "BTC");
    assert_eq!(row.get::<f64, _>("price"), 64_123.45);
    assert_eq!(row.get::<i64, _>("created_ms"), 1_700_000_000_000);
}

#[tokio::test]
async fn samples_accumulate_per_symbol() {
    let pool = setup_db().await;
    let repo = SqlxSampleRepository::new(pool.clone());

    for (i, (sym, price)) in [("BTC", 100.0), ("ETH", 10.0), ("BTC", 101.0)]
        .into_iter()
        .enumerate()
    {
        let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap();
        repo.append_sample(&AssetId::new(sym), price, ts).await.unwrap();
    }

    let rows = sqlx::query(
        "SELECT price FROM crypto_prices WHERE symbol = $1 ORDER BY created_ms ASC",
    )
    .bind("BTC")
    .fetch_all(&pool)
    .await
    .unwrap();

    let prices: Vec<f64> = rows.iter().map(|r| r.get::<f64, _>("price")).collect();
    assert_eq!(prices, vec![100.0, 101.0]);
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let pool = setup_db().await;

    migrate(&pool).await.unwrap();
    migrate(&pool).await.unwrap();

    let row = sqlx::query("SELECT COUNT(*) AS n FROM crypto_prices")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<i64, _>("n"), 0);
}

#[tokio::test]
async fn missing_table_surfaces_as_persist_error() {
    sqlx::any::install_default_drivers();
    let conn_str = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect(&conn_str)
        .await
        .unwrap();

    let repo = SqlxSampleRepository::new(pool);
    let result = repo
        .append_sample(&AssetId::new("BTC"), 1.0, Utc::now())
        .await;

    assert!(result.is_err(), "insert without schema must fail");
}
