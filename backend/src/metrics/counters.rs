use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub cycles_ok: Arc<AtomicU64>,
    pub cycles_fetch_failed: Arc<AtomicU64>,
    pub cycles_persist_aborted: Arc<AtomicU64>,

    pub samples_processed: Arc<AtomicU64>,
    pub samples_invalid: Arc<AtomicU64>,

    // alert path
    pub alerts_emitted: Arc<AtomicU64>,
    pub alerts_dropped: Arc<AtomicU64>,
    pub notify_failed: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub cycles_ok: u64,
    pub cycles_fetch_failed: u64,
    pub cycles_persist_aborted: u64,
    pub samples_processed: u64,
    pub samples_invalid: u64,
    pub alerts_emitted: u64,
    pub alerts_dropped: u64,
    pub notify_failed: u64,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CountersSnapshot {
            cycles_ok: load(&self.cycles_ok),
            cycles_fetch_failed: load(&self.cycles_fetch_failed),
            cycles_persist_aborted: load(&self.cycles_persist_aborted),
            samples_processed: load(&self.samples_processed),
            samples_invalid: load(&self.samples_invalid),
            alerts_emitted: load(&self.alerts_emitted),
            alerts_dropped: load(&self.alerts_dropped),
            notify_failed: load(&self.notify_failed),
        }
    }
}
