use std::sync::Arc;

use anyhow::Context;
use engine::HysteresisEngine;
use sentinel::{
    config::{AppConfig, startup_backoff_from_env},
    db::Db,
    feed::HttpTickSupplier,
    ingestion::{IngestionCycle, driver::retry_forever, run_ingestion_loop},
    logger::init_tracing,
    metrics::counters::Counters,
    notify::{AlertDispatcher, LogNotifier, Notifier, TelegramNotifier},
    persistence::SqlxSampleRepository,
};

/// Everything that must exist before the first cycle can run.
struct Services {
    cfg: AppConfig,
    db: Db,
    supplier: HttpTickSupplier,
    notifier: Arc<dyn Notifier>,
}

/// Loads config, connects and migrates the DB, builds the HTTP clients.
async fn init_services() -> anyhow::Result<Services> {
    let cfg = AppConfig::from_env().context("load configuration")?;

    let db = Db::connect(&cfg.database_url)
        .await
        .context("connect database")?;
    db.migrate().await.context("migrate database")?;

    let supplier =
        HttpTickSupplier::new(cfg.price_feed_url.clone()).context("build price feed client")?;

    let notifier: Arc<dyn Notifier> = match &cfg.telegram {
        Some(tg) => Arc::new(TelegramNotifier::new(tg).context("build telegram client")?),
        None => {
            tracing::warn!("TELEGRAM_TOKEN / TELEGRAM_CHAT_ID not set; alerts will only be logged");
            Arc::new(LogNotifier)
        }
    };

    Ok(Services {
        cfg,
        db,
        supplier,
        notifier,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    tracing::info!("Starting sentinel trailing alert service...");

    let Services {
        cfg,
        db,
        supplier,
        notifier,
    } = retry_forever("startup", startup_backoff_from_env(), init_services).await;

    tracing::info!(
        watchlist = ?cfg.watchlist,
        base_margin = cfg.margins.base(),
        every_s = cfg.poll_interval.as_secs(),
        "service initialized"
    );

    let counters = Counters::default();

    let (alerts, notify_worker) = AlertDispatcher::spawn(
        notifier,
        cfg.notify_queue_capacity,
        cfg.notify_timeout,
        counters.clone(),
    );

    let cycle = IngestionCycle::new(
        HysteresisEngine::new(cfg.margins.clone()),
        Arc::new(supplier),
        Arc::new(SqlxSampleRepository::new(db.pool.clone())),
        alerts,
        cfg.watchlist.clone(),
        counters.clone(),
    );

    tokio::select! {
        _ = run_ingestion_loop(cycle, cfg.poll_interval) => {
            tracing::error!("ingestion loop exited");
        }
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Shutdown signal received");
        }
    }

    notify_worker.abort();
    tracing::info!(counters = ?counters.snapshot(), "final counters");

    Ok(())
}
