use crate::engine::{Broker, MarketData, OrderRef};
use crate::models::{Candle, Quote};
use crate::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

const PRACTICE_HOST: &str = "https://api-fxpractice.oanda.com";
const LIVE_HOST: &str = "https://api-fxtrade.oanda.com";
const GRANULARITY: &str = "M5";

/// Client for the OANDA v20 REST API
///
/// Implements both pipeline collaborators: market data (candles and the
/// current bid/ask) and the broker (open trade count, market orders).
#[derive(Clone)]
pub struct OandaClient {
    client: Client,
    host: String,
    api_key: String,
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    candles: Vec<RawCandle>,
}

#[derive(Debug, Deserialize)]
struct RawCandle {
    time: DateTime<Utc>,
    bid: Option<RawOhlc>,
    ask: Option<RawOhlc>,
}

// OANDA serializes prices as strings
#[derive(Debug, Deserialize)]
struct RawOhlc {
    o: String,
    h: String,
    l: String,
    c: String,
}

#[derive(Debug, Deserialize)]
struct OpenTradesResponse {
    trades: Vec<OpenTrade>,
}

#[derive(Debug, Deserialize)]
struct OpenTrade {
    instrument: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    order_fill_transaction: Option<Transaction>,
    order_cancel_transaction: Option<CancelTransaction>,
}

#[derive(Debug, Deserialize)]
struct Transaction {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CancelTransaction {
    reason: Option<String>,
}

impl OandaClient {
    pub fn new(api_key: String, account_id: String, live: bool) -> Self {
        let host = if live { LIVE_HOST } else { PRACTICE_HOST };
        Self::with_host(host.to_string(), api_key, account_id)
    }

    pub fn with_host(host: String, api_key: String, account_id: String) -> Self {
        Self {
            client: Client::new(),
            host,
            api_key,
            account_id,
        }
    }

    /// Build a client from `OANDA_API_KEY`, `OANDA_ACCOUNT_ID` and the
    /// optional `OANDA_LIVE` flag
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OANDA_API_KEY")
            .map_err(|_| "OANDA_API_KEY not found in environment")?;
        let account_id = std::env::var("OANDA_ACCOUNT_ID")
            .map_err(|_| "OANDA_ACCOUNT_ID not found in environment")?;
        let live = std::env::var("OANDA_LIVE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self::new(api_key, account_id, live))
    }

    async fn get_candles(&self, instrument: &str, count: usize, price: &str) -> Result<Vec<RawCandle>> {
        let url = format!("{}/v3/instruments/{}/candles", self.host, instrument);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[
                ("count", count.to_string()),
                ("granularity", GRANULARITY.to_string()),
                ("price", price.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("OANDA candles request failed ({}): {}", status, error_text).into());
        }

        let body: CandlesResponse = response.json().await?;
        Ok(body.candles)
    }
}

impl RawOhlc {
    fn parse(&self) -> Result<(f64, f64, f64, f64)> {
        Ok((
            self.o.parse()?,
            self.h.parse()?,
            self.l.parse()?,
            self.c.parse()?,
        ))
    }
}

impl MarketData for OandaClient {
    /// Fetch `count` bid-price candles, oldest first
    ///
    /// A short response is an error: the pipeline must not compute
    /// indicators over a silently truncated window.
    async fn fetch_candles(&self, instrument: &str, count: usize) -> Result<Vec<Candle>> {
        let raw = self.get_candles(instrument, count, "B").await?;

        let mut candles = Vec::with_capacity(raw.len());
        for candle in raw {
            let bid = candle.bid.ok_or("Candle response missing bid prices")?;
            let (open, high, low, close) = bid.parse()?;
            candles.push(Candle {
                timestamp: candle.time,
                open,
                high,
                low,
                close,
            });
        }

        if candles.len() < count {
            return Err(format!(
                "Short candle response: got {}, requested {}",
                candles.len(),
                count
            )
            .into());
        }

        Ok(candles)
    }

    async fn latest_quote(&self, instrument: &str) -> Result<Quote> {
        let raw = self.get_candles(instrument, 1, "BA").await?;
        let candle = raw.last().ok_or("Empty candle response for quote")?;

        let bid = candle.bid.as_ref().ok_or("Quote candle missing bid prices")?;
        let ask = candle.ask.as_ref().ok_or("Quote candle missing ask prices")?;

        Ok(Quote {
            bid_open: bid.o.parse()?,
            ask_open: ask.o.parse()?,
        })
    }
}

impl Broker for OandaClient {
    async fn count_open_positions(&self, instrument: &str) -> Result<usize> {
        let url = format!("{}/v3/accounts/{}/openTrades", self.host, self.account_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("OANDA open trades request failed ({}): {}", status, error_text).into());
        }

        let body: OpenTradesResponse = response.json().await?;
        Ok(body
            .trades
            .iter()
            .filter(|t| t.instrument == instrument)
            .count())
    }

    async fn submit_market_order(
        &self,
        instrument: &str,
        units: i64,
        take_profit: f64,
        stop_loss: f64,
    ) -> Result<OrderRef> {
        let url = format!("{}/v3/accounts/{}/orders", self.host, self.account_id);

        let body = serde_json::json!({
            "order": {
                "type": "MARKET",
                "instrument": instrument,
                "units": units.to_string(),
                "timeInForce": "FOK",
                "positionFill": "DEFAULT",
                "takeProfitOnFill": { "price": format!("{:.5}", take_profit) },
                "stopLossOnFill": { "price": format!("{:.5}", stop_loss) },
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("OANDA order request failed ({}): {}", status, error_text).into());
        }

        let body: OrderResponse = response.json().await?;

        if let Some(fill) = body.order_fill_transaction {
            return Ok(OrderRef { id: fill.id });
        }
        if let Some(cancel) = body.order_cancel_transaction {
            let reason = cancel.reason.unwrap_or_else(|| "unknown".to_string());
            return Err(format!("Order cancelled by broker: {}", reason).into());
        }

        Err("Order submitted but not filled".into())
    }
}
