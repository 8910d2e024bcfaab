//! Alpha Vantage API client for stock quotes, price history and company data.
//!
//! Free tier limits are tight (25 requests/day, 5/minute); when they are hit
//! the API still answers 200 with a `Note` or `Information` message instead of
//! data, which is surfaced here as [`QuoteError::RateLimited`].

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tracing::debug;

use crate::error::AppError;
use crate::types::HistoricalPoint;

/// Errors from the quote API.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Alpha Vantage rate limit reached: {0}")]
    RateLimited(String),

    #[error("Invalid data from Alpha Vantage: {0}")]
    InvalidData(String),

    #[error("Request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for QuoteError {
    fn from(err: reqwest::Error) -> Self {
        QuoteError::Transport(err.to_string())
    }
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::RateLimited(msg) => AppError::RateLimited(msg),
            other => AppError::ExternalApi(other.to_string()),
        }
    }
}

pub type QuoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, QuoteError>> + Send + 'a>>;

/// Anything that can answer quote, history and overview lookups.
pub trait QuoteSource: Send + Sync {
    /// Latest quote for a symbol.
    fn global_quote<'a>(&'a self, symbol: &'a str) -> QuoteFuture<'a, GlobalQuote>;

    /// Full price series for a symbol, unsorted.
    fn time_series<'a>(
        &'a self,
        symbol: &'a str,
        series: SeriesKind,
    ) -> QuoteFuture<'a, Vec<HistoricalPoint>>;

    /// Company fundamentals.
    fn overview<'a>(&'a self, symbol: &'a str) -> QuoteFuture<'a, CompanyOverview>;
}

/// Which time series endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// `TIME_SERIES_INTRADAY` at 15 minute bars.
    Intraday15Min,
    /// `TIME_SERIES_DAILY`, compact output (last 100 days).
    Daily,
    /// `TIME_SERIES_WEEKLY`.
    Weekly,
}

impl SeriesKind {
    pub fn function(&self) -> &'static str {
        match self {
            SeriesKind::Intraday15Min => "TIME_SERIES_INTRADAY",
            SeriesKind::Daily => "TIME_SERIES_DAILY",
            SeriesKind::Weekly => "TIME_SERIES_WEEKLY",
        }
    }

    /// JSON key holding the series in the response.
    pub fn series_key(&self) -> &'static str {
        match self {
            SeriesKind::Intraday15Min => "Time Series (15min)",
            SeriesKind::Daily => "Time Series (Daily)",
            SeriesKind::Weekly => "Weekly Time Series",
        }
    }

    fn extra_params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            SeriesKind::Intraday15Min => &[("interval", "15min")],
            SeriesKind::Daily => &[("outputsize", "compact")],
            SeriesKind::Weekly => &[],
        }
    }
}

/// Global quote data.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "05. price")]
    pub price: String,
    #[serde(rename = "06. volume", default)]
    pub volume: String,
    #[serde(rename = "09. change", default)]
    pub change: String,
    #[serde(rename = "10. change percent", default)]
    pub change_percent: String,
}

impl GlobalQuote {
    pub fn price(&self) -> f64 {
        self.price.parse().unwrap_or(0.0)
    }

    pub fn change(&self) -> f64 {
        self.change.parse().unwrap_or(0.0)
    }

    pub fn change_percent(&self) -> f64 {
        parse_change_percent(&self.change_percent)
    }

    pub fn volume(&self) -> u64 {
        self.volume.parse().unwrap_or(0)
    }
}

/// Individual time series data point.
#[derive(Debug, Clone, Deserialize)]
struct TimeSeriesDataPoint {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Company overview data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyOverview {
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Exchange")]
    pub exchange: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
}

impl CompanyOverview {
    pub fn market_cap(&self) -> Option<u64> {
        self.market_cap.as_deref().and_then(|s| s.parse().ok())
    }

    /// P/E ratio; Alpha Vantage reports "None" or "-" when there is none.
    pub fn pe_ratio(&self) -> Option<f64> {
        self.pe_ratio.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Parse change percent string (e.g., "1.23%" -> 1.23).
pub fn parse_change_percent(s: &str) -> f64 {
    s.trim_end_matches('%').parse().unwrap_or(0.0)
}

/// Detect the throttling message Alpha Vantage returns in place of data.
fn rate_limit_message(body: &Value) -> Option<String> {
    ["Note", "Information"].iter().find_map(|key| {
        let msg = body.get(*key)?.as_str()?;
        let lower = msg.to_lowercase();
        if lower.contains("call frequency") || lower.contains("rate limit") {
            Some(msg.to_string())
        } else {
            None
        }
    })
}

/// Parse a `GLOBAL_QUOTE` response body.
pub fn parse_global_quote(body: Value) -> Result<GlobalQuote, QuoteError> {
    if let Some(msg) = rate_limit_message(&body) {
        return Err(QuoteError::RateLimited(msg));
    }

    let quote = body
        .get("Global Quote")
        .cloned()
        .and_then(|q| serde_json::from_value::<GlobalQuote>(q).ok())
        .ok_or_else(|| QuoteError::InvalidData("missing Global Quote".to_string()))?;

    if quote.price.is_empty() || quote.price.parse::<f64>().is_err() {
        return Err(QuoteError::InvalidData(format!(
            "unparseable price for {}",
            quote.symbol
        )));
    }

    Ok(quote)
}

/// Parse a time series response body into unsorted bars.
pub fn parse_time_series(body: Value, series: SeriesKind) -> Result<Vec<HistoricalPoint>, QuoteError> {
    if let Some(msg) = rate_limit_message(&body) {
        return Err(QuoteError::RateLimited(msg));
    }

    let raw = body
        .get(series.series_key())
        .cloned()
        .ok_or_else(|| QuoteError::InvalidData(format!("no `{}` in response", series.series_key())))?;

    let points: HashMap<String, TimeSeriesDataPoint> = serde_json::from_value(raw)
        .map_err(|e| QuoteError::InvalidData(e.to_string()))?;

    Ok(points
        .into_iter()
        .map(|(date, point)| HistoricalPoint {
            date,
            open: point.open.parse().unwrap_or(0.0),
            high: point.high.parse().unwrap_or(0.0),
            low: point.low.parse().unwrap_or(0.0),
            close: point.close.parse().unwrap_or(0.0),
            volume: point.volume.parse().unwrap_or(0),
        })
        .collect())
}

/// Parse an `OVERVIEW` response body. A body without `Symbol` is invalid.
pub fn parse_overview(body: Value) -> Result<CompanyOverview, QuoteError> {
    if let Some(msg) = rate_limit_message(&body) {
        return Err(QuoteError::RateLimited(msg));
    }

    let overview: CompanyOverview =
        serde_json::from_value(body).map_err(|e| QuoteError::InvalidData(e.to_string()))?;

    if overview.symbol.is_none() {
        return Err(QuoteError::InvalidData("overview without Symbol".to_string()));
    }

    Ok(overview)
}

/// Alpha Vantage API client.
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a GET against the query endpoint. Parameters are URL-encoded.
    fn request(
        &self,
        function: &str,
        symbol: &str,
        extra: &[(&str, &str)],
    ) -> Result<reqwest::Request, QuoteError> {
        Ok(self
            .client
            .get(&self.base_url)
            .query(&[("function", function), ("symbol", symbol)])
            .query(extra)
            .query(&[("apikey", self.api_key.as_str())])
            .build()?)
    }

    async fn query(
        &self,
        function: &str,
        symbol: &str,
        extra: &[(&str, &str)],
    ) -> Result<Value, QuoteError> {
        debug!("Alpha Vantage request: function={} symbol={}", function, symbol);
        let request = self.request(function, symbol, extra)?;

        let response = self.client.execute(request).await?;

        if !response.status().is_success() {
            return Err(QuoteError::Transport(format!("API error: {}", response.status())));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| QuoteError::InvalidData(format!("Parse error: {}", e)))
    }

    /// Get global quote for a symbol.
    pub async fn get_quote(&self, symbol: &str) -> Result<GlobalQuote, QuoteError> {
        let body = self.query("GLOBAL_QUOTE", symbol, &[]).await?;
        parse_global_quote(body)
    }

    /// Get a time series for a symbol.
    pub async fn get_time_series(
        &self,
        symbol: &str,
        series: SeriesKind,
    ) -> Result<Vec<HistoricalPoint>, QuoteError> {
        let body = self
            .query(series.function(), symbol, series.extra_params())
            .await?;
        parse_time_series(body, series)
    }

    /// Get company overview.
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview, QuoteError> {
        let body = self.query("OVERVIEW", symbol, &[]).await?;
        parse_overview(body)
    }
}

impl QuoteSource for AlphaVantageClient {
    fn global_quote<'a>(&'a self, symbol: &'a str) -> QuoteFuture<'a, GlobalQuote> {
        Box::pin(self.get_quote(symbol))
    }

    fn time_series<'a>(
        &'a self,
        symbol: &'a str,
        series: SeriesKind,
    ) -> QuoteFuture<'a, Vec<HistoricalPoint>> {
        Box::pin(self.get_time_series(symbol, series))
    }

    fn overview<'a>(&'a self, symbol: &'a str) -> QuoteFuture<'a, CompanyOverview> {
        Box::pin(self.get_company_overview(symbol))
    }
}
