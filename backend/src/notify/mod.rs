//! Outbound alert delivery.
//!
//! Delivery is best-effort: a failed send is logged and counted by the
//! dispatcher worker, never retried, and never reaches engine state.

pub mod dispatcher;
pub mod log;
pub mod message;
pub mod telegram;

use async_trait::async_trait;
use engine::AlertEvent;
use thiserror::Error;

pub use dispatcher::AlertDispatcher;
pub use log::LogNotifier;
pub use telegram::TelegramNotifier;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("delivery timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &AlertEvent) -> Result<(), NotifyError>;
}
