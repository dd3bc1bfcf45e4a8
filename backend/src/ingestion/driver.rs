//! Fixed-cadence driver for the ingestion cycle.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crate::error::CycleError;
use crate::ingestion::cycle::IngestionCycle;

/// Runs `cycle` every `every`, forever.
///
/// Each cycle is awaited inside the loop, so cycles never overlap. If a cycle
/// outlasts the interval the missed ticks are skipped and the next cycle
/// starts on the following tick boundary.
pub async fn run_ingestion_loop(mut cycle: IngestionCycle, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(every_ms = every.as_millis() as u64, "ingestion loop started");

    loop {
        ticker.tick().await;

        match cycle.run_once(Utc::now()).await {
            Ok(report) => info!(
                fetched = report.fetched,
                processed = report.processed,
                invalid = report.invalid,
                alerts = report.alerts.len(),
                "cycle complete"
            ),
            Err(e @ CycleError::Fetch(_)) => {
                warn!(error = %e, "cycle skipped; retrying next interval")
            }
            Err(e @ CycleError::Persist { .. }) => {
                error!(error = %e, "cycle aborted; remaining samples skipped")
            }
        }
    }
}

/// Retries `op` with a fixed backoff until it succeeds.
///
/// Used for startup (config, database) so a missing dependency delays the
/// service instead of crashing it.
pub async fn retry_forever<T, F, Fut>(label: &'static str, backoff: Duration, mut op: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(v) => {
                if attempt > 1 {
                    info!(label, attempt, "initialization succeeded after retries");
                }
                return v;
            }
            Err(e) => {
                error!(
                    error = ?e,
                    label,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "initialization failed; retrying"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
