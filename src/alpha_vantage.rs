//! Alpha Vantage daily time series client.

use crate::candles::{RawDailyEntry, Status};
use crate::error::ChartError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

/// Raw daily entries for one ticker plus the provider's own verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResponse {
    pub status: Status,
    /// Provider message accompanying a non-`ok` status.
    pub message: Option<String>,
    pub entries: Vec<RawDailyEntry>,
}

/// Anything that can deliver a ticker's raw daily history.
#[allow(async_fn_in_trait)]
pub trait QuoteSource {
    async fn daily_entries(&self, ticker: &str) -> Result<QuoteResponse, ChartError>;
}

/// `outputsize` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 data points only.
    Compact,
    #[default]
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(format!("unknown output size '{}', expected compact or full", other)),
        }
    }
}

/// Fields of one day in the `Time Series (Daily)` object.
#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open", default)]
    open: String,
    #[serde(rename = "2. high", default)]
    high: String,
    #[serde(rename = "3. low", default)]
    low: String,
    #[serde(rename = "4. close", default)]
    close: String,
    #[serde(rename = "5. volume", default)]
    volume: String,
}

pub struct AlphaVantageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    output_size: OutputSize,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            output_size: OutputSize::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_output_size(mut self, output_size: OutputSize) -> Self {
        self.output_size = output_size;
        self
    }

    pub async fn get_daily_time_series(&self, ticker: &str) -> Result<QuoteResponse, ChartError> {
        let url = format!("{}/query", self.base_url);
        debug!(ticker, output_size = %self.output_size, "requesting daily time series");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", ticker),
                ("outputsize", self.output_size.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChartError::Provider(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        parse_daily_response(body)
    }
}

impl QuoteSource for AlphaVantageClient {
    async fn daily_entries(&self, ticker: &str) -> Result<QuoteResponse, ChartError> {
        self.get_daily_time_series(ticker).await
    }
}

/// Decode a `TIME_SERIES_DAILY` response body.
///
/// Alpha Vantage answers HTTP 200 for most failures and signals them through
/// `Error Message`, `Note` or `Information` keys, which become non-`ok`
/// statuses here.
pub fn parse_daily_response(body: Value) -> Result<QuoteResponse, ChartError> {
    let provider_status = [
        ("Error Message", Status::Error),
        ("Note", Status::Other("rate_limited".to_string())),
        ("Information", Status::Other("information".to_string())),
    ];
    for (key, status) in provider_status {
        if let Some(message) = body.get(key) {
            return Ok(QuoteResponse {
                status,
                message: Some(message.as_str().unwrap_or_default().to_string()),
                entries: Vec::new(),
            });
        }
    }

    let series = body
        .get(DAILY_SERIES_KEY)
        .cloned()
        .ok_or_else(|| ChartError::Provider(format!("response has no '{}' object", DAILY_SERIES_KEY)))?;
    let bars: HashMap<String, DailyBar> = serde_json::from_value(series)
        .map_err(|e| ChartError::Provider(format!("malformed daily series: {}", e)))?;

    let entries = bars
        .into_iter()
        .map(|(date, bar)| RawDailyEntry {
            date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
        .collect();

    Ok(QuoteResponse {
        status: Status::Ok,
        message: None,
        entries,
    })
}
