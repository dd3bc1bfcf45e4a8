use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use engine::MarginTable;

use crate::error::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://sentinel_dev.db?mode=rwc";
const DEFAULT_WATCH_LIST: &str = "bitcoin,ethereum,solana";
const DEFAULT_MARGIN_SCALES: &str = "ETH=0.1,SOL=0.01";
const DEFAULT_PRICE_FEED_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_STARTUP_BACKOFF_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// sqlx Any connection string (sqlite or postgres).
    pub database_url: String,

    // =========================
    // Feed
    // =========================
    /// Upstream coin ids polled every cycle, in processing order.
    pub watchlist: Vec<String>,

    /// Base URL of the simple-price API.
    pub price_feed_url: String,

    /// Fixed cadence of the ingestion cycle.
    ///
    /// A cycle that runs longer than this causes the missed ticks to be
    /// skipped; cycles never overlap.
    pub poll_interval: Duration,

    // =========================
    // Alerting
    // =========================
    /// Base margin and per-asset scale factors. Required.
    pub margins: MarginTable,

    /// Telegram credentials. When absent alerts are only logged.
    pub telegram: Option<TelegramConfig>,

    /// Capacity of the queue between the ingestion cycle and the notifier.
    ///
    /// When full, new alerts are dropped instead of stalling ingestion.
    pub notify_queue_capacity: usize,

    /// Upper bound on a single delivery attempt.
    pub notify_timeout: Duration,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (env, map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let watchlist =
            parse_watchlist(&get("WATCH_LIST").unwrap_or_else(|| DEFAULT_WATCH_LIST.to_string()))?;

        let base_margin: f64 = parse_required(&get, "DROP_MARGIN")?;
        let scales = MarginTable::parse_scales(
            &get("MARGIN_SCALES").unwrap_or_else(|| DEFAULT_MARGIN_SCALES.to_string()),
        )?;
        let margins = MarginTable::new(base_margin, scales)?;

        let telegram = match (get("TELEGRAM_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig { token, chat_id }),
            _ => None,
        };

        Ok(Self {
            database_url,
            watchlist,
            price_feed_url: get("PRICE_FEED_URL")
                .unwrap_or_else(|| DEFAULT_PRICE_FEED_URL.to_string()),
            poll_interval: Duration::from_secs(parse_or(&get, "POLL_INTERVAL_SECS", 60u64)?.max(1)),
            margins,
            telegram,
            notify_queue_capacity: parse_or(&get, "NOTIFY_QUEUE_CAPACITY", 64usize)?.max(1),
            notify_timeout: Duration::from_secs(parse_or(&get, "NOTIFY_TIMEOUT_SECS", 10u64)?),
        })
    }
}

/// Sleep between failed startup attempts. Read on its own because it is
/// needed before a config has been loaded successfully; falls back to the
/// default on a missing or unparsable value.
pub fn startup_backoff_from_env() -> Duration {
    let secs = std::env::var("STARTUP_BACKOFF_SECS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_STARTUP_BACKOFF_SECS);
    Duration::from_secs(secs)
}

fn parse_watchlist(raw: &str) -> Result<Vec<String>, ConfigError> {
    let ids: Vec<String> = raw
        .split(',')
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .collect();

    if ids.is_empty() {
        return Err(ConfigError::Invalid {
            var: "WATCH_LIST",
            reason: "no coin ids".into(),
        });
    }
    Ok(ids)
}

fn parse_required<T, G>(get: &G, var: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(var).ok_or(ConfigError::Missing(var))?;
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(_) => parse_required(get, var),
        None => Ok(default),
    }
}
