use std::collections::HashMap;

use engine::AssetId;
use serde::Deserialize;

/// `GET /simple/price?ids=..&vs_currencies=usd` body: `{ "<coin id>": { "usd": 123.4 } }`.
pub type SimplePriceResponse = HashMap<String, CoinQuote>;

#[derive(Debug, Deserialize)]
pub struct CoinQuote {
    pub usd: Option<f64>,
}

/// One raw price observation from the feed, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub coin_id: String,
    pub symbol: AssetId,
    /// `None` when the feed omitted the coin or its USD price.
    pub price: Option<f64>,
}

impl Tick {
    pub fn new(coin_id: impl Into<String>, price: Option<f64>) -> Self {
        let coin_id = coin_id.into();
        Self {
            symbol: symbol_for(&coin_id),
            coin_id,
            price,
        }
    }
}

/// Maps an upstream coin id to the ticker used as the asset key.
pub fn symbol_for(coin_id: &str) -> AssetId {
    match coin_id.trim().to_lowercase().as_str() {
        "bitcoin" => AssetId::new("BTC"),
        "ethereum" => AssetId::new("ETH"),
        "solana" => AssetId::new("SOL"),
        other => AssetId::new(other),
    }
}

/// Orders the response by the watch-list and marks absent coins as missing.
pub fn ticks_in_watchlist_order(watchlist: &[String], mut body: SimplePriceResponse) -> Vec<Tick> {
    watchlist
        .iter()
        .map(|id| {
            let price = body.remove(id).and_then(|q| q.usd);
            Tick::new(id.clone(), price)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watchlist() -> Vec<String> {
        vec!["solana".into(), "bitcoin".into(), "dogecoin".into()]
    }

    #[test]
    fn known_ids_map_to_tickers_and_others_upper_case() {
        assert_eq!(symbol_for("bitcoin").as_str(), "BTC");
        assert_eq!(symbol_for("Ethereum").as_str(), "ETH");
        assert_eq!(symbol_for("dogecoin").as_str(), "DOGECOIN");
    }

    #[test]
    fn ticks_follow_watchlist_order_and_flag_missing() {
        let body: SimplePriceResponse = serde_json::from_str(
            r#"{ "bitcoin": { "usd": 64123.5 }, "solana": { "usd": 142.07 }, "cardano": { "usd": 0.4 } }"#,
        )
        .unwrap();

        let ticks = ticks_in_watchlist_order(&watchlist(), body);

        assert_eq!(
            ticks,
            vec![
                Tick::new("solana", Some(142.07)),
                Tick::new("bitcoin", Some(64123.5)),
                Tick::new("dogecoin", None),
            ]
        );
        assert_eq!(ticks[0].symbol.as_str(), "SOL");
    }

    #[test]
    fn quote_without_usd_is_missing() {
        let body: SimplePriceResponse =
            serde_json::from_str(r#"{ "bitcoin": {} }"#).unwrap();

        let ticks = ticks_in_watchlist_order(&["bitcoin".to_string()], body);

        assert_eq!(ticks[0].price, None);
    }
}
