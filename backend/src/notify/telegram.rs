use std::time::Duration;

use async_trait::async_trait;
use engine::AlertEvent;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::TelegramConfig;
use crate::notify::message::render_markdown;
use crate::notify::{Notifier, NotifyError};

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Posts alerts to a Telegram chat through the Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, NotifyError> {
        Self::with_api_base(cfg, TELEGRAM_API.to_string())
    }

    /// Same as [`TelegramNotifier::new`] against a different Bot API host.
    pub fn with_api_base(cfg: &TelegramConfig, api_base: String) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
            chat_id: cfg.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(
        skip(self, event),
        fields(asset = %event.asset, direction = %event.direction),
        level = "debug"
    )]
    async fn send(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": render_markdown(event),
            "parse_mode": "Markdown",
        });

        // The URL embeds the bot token; keep it out of error messages.
        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("telegram alert accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use engine::{AssetId, Direction};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const TOKEN: &str = "123456:secret-bot-token";

    fn config() -> TelegramConfig {
        TelegramConfig {
            token: TOKEN.to_string(),
            chat_id: "42".to_string(),
        }
    }

    fn dump_event() -> AlertEvent {
        AlertEvent {
            asset: AssetId::new("BTC"),
            direction: Direction::Dump,
            current_price: 61_000.0,
            reference_price: 64_000.0,
            trigger_threshold: 63_500.0,
            observed_at: Utc::now(),
        }
    }

    /// Serves one request with `response` and hands back the raw request.
    async fn one_shot_server(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(raw).unwrap()
        });

        (base, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= content_length
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let (base, server) = one_shot_server(
            "HTTP/1.1 401 Unauthorized\r\ncontent-length: 12\r\nconnection: close\r\n\r\nUnauthorized",
        )
        .await;
        let notifier = TelegramNotifier::with_api_base(&config(), base).unwrap();
        let event = dump_event();

        let err = notifier.send(&event).await.unwrap_err();
        match err {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        let request = server.await.unwrap();
        assert!(request.starts_with(&format!("POST /bot{TOKEN}/sendMessage ")));

        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        let payload: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(payload["chat_id"], "42");
        assert_eq!(payload["parse_mode"], "Markdown");
        assert_eq!(payload["text"], render_markdown(&event));
    }

    #[tokio::test]
    async fn accepted_message_is_ok() {
        let (base, server) = one_shot_server(
            "HTTP/1.1 200 OK\r\ncontent-length: 11\r\nconnection: close\r\n\r\n{\"ok\":true}",
        )
        .await;
        let notifier = TelegramNotifier::with_api_base(&config(), base).unwrap();

        notifier.send(&dump_event()).await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_token() {
        let notifier =
            TelegramNotifier::with_api_base(&config(), "http://127.0.0.1:1".to_string()).unwrap();

        let err = notifier.send(&dump_event()).await.unwrap_err();

        assert!(matches!(err, NotifyError::Http(_)));
        assert!(!err.to_string().contains(TOKEN));
    }
}
