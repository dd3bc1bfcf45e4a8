//! One ingestion cycle: fetch a batch, persist and evaluate each sample.
//!
//! Data flow:
//! TickSupplier → (SampleRepository, HysteresisEngine) → AlertDispatcher
//!
//! Failure behavior:
//! - fetch failure: nothing is applied; the next interval retries.
//! - invalid sample: skipped, the batch continues.
//! - persistence failure: the rest of the batch is skipped; watermark
//!   updates from earlier samples in the batch are kept.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use engine::{AlertEvent, HysteresisEngine, PriceSample};
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

use crate::error::CycleError;
use crate::feed::TickSupplier;
use crate::logger::{annotate_span, cycle_span, warn_if_slow};
use crate::metrics::counters::Counters;
use crate::notify::AlertDispatcher;
use crate::persistence::SampleRepository;

#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub fetched: usize,
    pub processed: usize,
    pub invalid: usize,
    /// Alerts emitted this cycle, in emission order.
    pub alerts: Vec<AlertEvent>,
}

/// Owns the engine exclusively; cycles run one at a time through `&mut self`.
pub struct IngestionCycle {
    engine: HysteresisEngine,
    supplier: Arc<dyn TickSupplier>,
    repo: Arc<dyn SampleRepository>,
    alerts: AlertDispatcher,
    watchlist: Vec<String>,
    counters: Counters,
}

impl IngestionCycle {
    pub fn new(
        engine: HysteresisEngine,
        supplier: Arc<dyn TickSupplier>,
        repo: Arc<dyn SampleRepository>,
        alerts: AlertDispatcher,
        watchlist: Vec<String>,
        counters: Counters,
    ) -> Self {
        Self {
            engine,
            supplier,
            repo,
            alerts,
            watchlist,
            counters,
        }
    }

    pub fn engine(&self) -> &HysteresisEngine {
        &self.engine
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Runs one cycle. `now` stamps every sample of the batch.
    pub async fn run_once(&mut self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let cycle_id = Uuid::new_v4();
        let span = cycle_span(&cycle_id);
        self.run_batch(now).instrument(span).await
    }

    async fn run_batch(&mut self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let ticks = match warn_if_slow(
            "feed_fetch",
            Duration::from_secs(5),
            self.supplier.fetch(&self.watchlist),
        )
        .await
        {
            Ok(ticks) => ticks,
            Err(e) => {
                Counters::incr(&self.counters.cycles_fetch_failed);
                return Err(CycleError::Fetch(e));
            }
        };

        let mut report = CycleReport {
            fetched: ticks.len(),
            ..CycleReport::default()
        };

        for tick in ticks {
            annotate_span(tick.symbol.as_str());

            let sample = match PriceSample::from_feed(tick.symbol, tick.price, now) {
                Ok(sample) => sample,
                Err(e) => {
                    Counters::incr(&self.counters.samples_invalid);
                    report.invalid += 1;
                    warn!(error = %e, coin_id = %tick.coin_id, "invalid sample skipped");
                    continue;
                }
            };

            let persisted = warn_if_slow(
                "db_append_sample",
                Duration::from_millis(100),
                self.repo
                    .append_sample(&sample.asset, sample.price, sample.observed_at),
            )
            .await;

            if let Err(source) = persisted {
                Counters::incr(&self.counters.cycles_persist_aborted);
                return Err(CycleError::Persist {
                    asset: sample.asset,
                    applied: report.processed,
                    source,
                });
            }

            debug!(asset = %sample.asset, price = sample.price, "sample saved");

            // Already validated by `from_feed`.
            let observation = match self.engine.observe(&sample) {
                Ok(obs) => obs,
                Err(e) => {
                    Counters::incr(&self.counters.samples_invalid);
                    report.invalid += 1;
                    warn!(error = %e, "engine rejected sample");
                    continue;
                }
            };

            Counters::incr(&self.counters.samples_processed);
            report.processed += 1;

            for alert in observation.alerts {
                Counters::incr(&self.counters.alerts_emitted);
                info!(
                    asset = %alert.asset,
                    direction = %alert.direction,
                    price = alert.current_price,
                    reference = alert.reference_price,
                    threshold = alert.trigger_threshold,
                    "alert triggered"
                );
                self.alerts.dispatch(alert.clone());
                report.alerts.push(alert);
            }
        }

        Counters::incr(&self.counters.cycles_ok);
        Ok(report)
    }
}
