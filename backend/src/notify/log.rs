use async_trait::async_trait;
use engine::AlertEvent;
use tracing::info;

use crate::notify::{Notifier, NotifyError};

/// Fallback notifier when no messaging channel is configured.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        info!(
            asset = %event.asset,
            direction = %event.direction,
            current = event.current_price,
            reference = event.reference_price,
            threshold = event.trigger_threshold,
            "alert (no channel configured)"
        );
        Ok(())
    }
}
