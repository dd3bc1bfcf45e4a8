use std::sync::Arc;
use std::time::Duration;

use engine::AlertEvent;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::metrics::counters::Counters;
use crate::notify::{Notifier, NotifyError};

/// Hands alerts from the ingestion path to a delivery worker.
///
/// The queue is bounded and `dispatch` never waits: when the worker falls
/// behind, new alerts are dropped so a slow channel cannot delay the next cycle.
#[derive(Clone)]
pub struct AlertDispatcher {
    tx: Sender<AlertEvent>,
    counters: Counters,
}

impl AlertDispatcher {
    /// Spawns the delivery worker. The worker exits once every dispatcher
    /// clone has been dropped and the queue has drained.
    pub fn spawn(
        notifier: Arc<dyn Notifier>,
        capacity: usize,
        send_timeout: Duration,
        counters: Counters,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_delivery_worker(
            rx,
            notifier,
            send_timeout,
            counters.clone(),
        ));

        (Self { tx, counters }, worker)
    }

    /// Queues an alert for delivery. Returns `false` if it was dropped.
    pub fn dispatch(&self, event: AlertEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(ev)) => {
                Counters::incr(&self.counters.alerts_dropped);
                warn!(asset = %ev.asset, direction = %ev.direction, "alert queue full; alert dropped");
                false
            }
            Err(TrySendError::Closed(ev)) => {
                Counters::incr(&self.counters.alerts_dropped);
                warn!(asset = %ev.asset, direction = %ev.direction, "alert worker gone; alert dropped");
                false
            }
        }
    }
}

async fn run_delivery_worker(
    mut rx: Receiver<AlertEvent>,
    notifier: Arc<dyn Notifier>,
    send_timeout: Duration,
    counters: Counters,
) {
    while let Some(event) = rx.recv().await {
        let outcome = match tokio::time::timeout(send_timeout, notifier.send(&event)).await {
            Ok(res) => res,
            Err(_) => Err(NotifyError::Timeout(send_timeout)),
        };

        match outcome {
            Ok(()) => info!(
                asset = %event.asset,
                direction = %event.direction,
                price = event.current_price,
                "alert sent"
            ),
            Err(e) => {
                Counters::incr(&counters.notify_failed);
                warn!(
                    error = %e,
                    asset = %event.asset,
                    direction = %event.direction,
                    "alert delivery failed; not retried"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use engine::{AssetId, Direction};
    use tokio::sync::Mutex;
    use tracing_test::traced_test;

    fn event(asset: &str) -> AlertEvent {
        AlertEvent {
            asset: AssetId::new(asset),
            direction: Direction::Dump,
            current_price: 80.0,
            reference_price: 100.0,
            trigger_threshold: 85.0,
            observed_at: Utc::now(),
        }
    }

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<AlertEvent>>,
    }

    #[async_trait]
    impl Notifier for Recording {
        async fn send(&self, event: &AlertEvent) -> Result<(), NotifyError> {
            self.sent.lock().await.push(event.clone());
            Ok(())
        }
    }

    struct Rejecting;

    #[async_trait]
    impl Notifier for Rejecting {
        async fn send(&self, _event: &AlertEvent) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected {
                status: 401,
                body: "Unauthorized".into(),
            })
        }
    }

    struct Hanging;

    #[async_trait]
    impl Notifier for Hanging {
        async fn send(&self, _event: &AlertEvent) -> Result<(), NotifyError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn delivers_in_dispatch_order() {
        let notifier = Arc::new(Recording::default());
        let counters = Counters::default();
        let (dispatcher, worker) =
            AlertDispatcher::spawn(notifier.clone(), 8, Duration::from_secs(1), counters.clone());

        assert!(dispatcher.dispatch(event("BTC")));
        assert!(dispatcher.dispatch(event("ETH")));
        drop(dispatcher);
        worker.await.unwrap();

        let sent = notifier.sent.lock().await;
        let assets: Vec<&str> = sent.iter().map(|e| e.asset.as_str()).collect();
        assert_eq!(assets, vec!["BTC", "ETH"]);
        assert_eq!(counters.snapshot().notify_failed, 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn full_queue_drops_instead_of_blocking() {
        let notifier = Arc::new(Recording::default());
        let counters = Counters::default();
        let (dispatcher, worker) =
            AlertDispatcher::spawn(notifier.clone(), 1, Duration::from_secs(1), counters.clone());

        // Current-thread runtime: the worker has not run yet, so the second
        // alert finds the single slot occupied.
        assert!(dispatcher.dispatch(event("BTC")));
        assert!(!dispatcher.dispatch(event("ETH")));
        assert_eq!(counters.snapshot().alerts_dropped, 1);
        assert!(logs_contain("alert queue full; alert dropped"));

        drop(dispatcher);
        worker.await.unwrap();
        assert_eq!(notifier.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_is_counted_not_retried() {
        let counters = Counters::default();
        let (dispatcher, worker) =
            AlertDispatcher::spawn(Arc::new(Rejecting), 4, Duration::from_secs(1), counters.clone());

        dispatcher.dispatch(event("SOL"));
        drop(dispatcher);
        worker.await.unwrap();

        assert_eq!(counters.snapshot().notify_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_channel_times_out() {
        let counters = Counters::default();
        let (dispatcher, worker) =
            AlertDispatcher::spawn(Arc::new(Hanging), 4, Duration::from_secs(5), counters.clone());

        dispatcher.dispatch(event("BTC"));
        dispatcher.dispatch(event("ETH"));
        drop(dispatcher);
        worker.await.unwrap();

        assert_eq!(counters.snapshot().notify_failed, 2);
    }
}
