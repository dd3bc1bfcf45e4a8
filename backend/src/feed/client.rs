use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::feed::TickSupplier;
use crate::feed::errors::FeedError;
use crate::feed::types::{SimplePriceResponse, Tick, ticks_in_watchlist_order};

/// Tick supplier backed by a CoinGecko-compatible simple-price endpoint.
#[derive(Clone)]
pub struct HttpTickSupplier {
    http: Client,
    url: String,
}

impl HttpTickSupplier {
    pub fn new(url: String) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TickSupplier for HttpTickSupplier {
    #[instrument(skip(self, watchlist), fields(assets = watchlist.len()), level = "debug")]
    async fn fetch(&self, watchlist: &[String]) -> Result<Vec<Tick>, FeedError> {
        let url = format!("{}/simple/price", self.url);
        let ids = watchlist.join(",");

        let resp = self
            .http
            .get(&url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?;

        let body: SimplePriceResponse = resp.json().await?;

        if !watchlist.is_empty() && !watchlist.iter().any(|id| body.contains_key(id)) {
            return Err(FeedError::InvalidResponse(format!(
                "no watched coin in response ({} entries)",
                body.len()
            )));
        }

        debug!(entries = body.len(), "price batch fetched");

        Ok(ticks_in_watchlist_order(watchlist, body))
    }
}
