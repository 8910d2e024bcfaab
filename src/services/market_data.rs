//! Cached access to quotes, price history and company metadata.
//!
//! Reads go through the document store first; stale or missing documents are
//! refreshed from the [`QuoteSource`]. Quote lookups never fail: rate limits
//! and API errors degrade to stale or simulated prices.

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::simulation;
use super::SqliteStore;
use crate::config::Config;
use crate::error::Result;
use crate::sources::{QuoteError, QuoteSource, SeriesKind};
use crate::types::{
    AssetMetadata, HistoricalPoint, IndexHistoryPoint, MarketIndex, PriceQuote, Timeframe,
};

/// Index ETFs shown on the dashboard: (symbol, display name, history key).
pub const MARKET_INDICES: [(&str, &str, &str); 4] = [
    ("SPY", "S&P 500", "sp500"),
    ("QQQ", "Nasdaq", "nasdaq"),
    ("DIA", "Dow Jones", "dowJones"),
    ("IWM", "Russell 2000", "russell2000"),
];

/// Symbols refreshed concurrently by [`MarketDataService::update_watchlist`].
const WATCHLIST_BATCH_SIZE: usize = 5;

/// Intraday bars kept for a one day chart (24h of 15 minute bars).
const INTRADAY_POINTS: usize = 96;

pub struct MarketDataService {
    store: Arc<SqliteStore>,
    source: Arc<dyn QuoteSource>,
    quote_ttl_secs: u64,
    metadata_ttl_secs: u64,
    watchlist_pause: Duration,
    rng: Mutex<StdRng>,
}

impl MarketDataService {
    pub fn new(store: Arc<SqliteStore>, source: Arc<dyn QuoteSource>, config: &Config) -> Self {
        Self {
            store,
            source,
            quote_ttl_secs: config.quote_cache_ttl_secs,
            metadata_ttl_secs: config.metadata_cache_ttl_secs,
            watchlist_pause: Duration::from_secs(1),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Use a fixed seed for simulated values.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Pause between watchlist batches.
    pub fn with_watchlist_pause(mut self, pause: Duration) -> Self {
        self.watchlist_pause = pause;
        self
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current quote for `symbol`. Never fails.
    pub async fn fetch_current_price(&self, symbol: &str) -> PriceQuote {
        let now = Utc::now().timestamp_millis();
        let cached = match self.store.get_quote(symbol) {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Failed to read cached quote for {}: {}", symbol, e);
                None
            }
        };

        if let Some(ref entry) = cached {
            if entry.is_fresh(self.quote_ttl_secs, now) {
                debug!("Using cached price for {}", symbol);
                return entry.value.clone();
            }
        }

        match self.source.global_quote(symbol).await {
            Ok(raw) => {
                let fetched_at = Utc::now();
                let quote = PriceQuote {
                    symbol: symbol.to_string(),
                    price: raw.price(),
                    change: raw.change(),
                    change_percent: raw.change_percent(),
                    volume: raw.volume(),
                    timestamp: fetched_at.timestamp_millis(),
                    last_updated: fetched_at.to_rfc3339(),
                    simulated: false,
                };
                if let Err(e) = self.store.put_quote(&quote) {
                    warn!("Failed to cache quote for {}: {}", symbol, e);
                }
                quote
            }
            Err(QuoteError::RateLimited(_)) => {
                warn!("Alpha Vantage rate limit reached for {}, using fallback data", symbol);
                match cached {
                    Some(entry) => {
                        let mut quote = entry.value;
                        quote.last_updated = Utc::now().to_rfc3339();
                        quote
                    }
                    None => self.simulated_quote(symbol),
                }
            }
            Err(e) => {
                warn!("Error fetching current price for {}: {}", symbol, e);
                self.simulated_quote(symbol)
            }
        }
    }

    /// Locally generated quote for `symbol`.
    pub fn simulated_quote(&self, symbol: &str) -> PriceQuote {
        simulation::simulated_quote(symbol, &mut *self.rng())
    }

    /// OHLCV bars for `symbol` over `timeframe`, oldest first.
    pub async fn fetch_historical_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<HistoricalPoint>> {
        let now = Utc::now().timestamp_millis();
        if let Some(cached) = self.store.get_history(symbol, timeframe)? {
            if cached.is_fresh(self.quote_ttl_secs, now) {
                debug!("Using cached historical data for {} ({})", symbol, timeframe.as_str());
                return Ok(cached.value);
            }
        }

        let mut points = self
            .source
            .time_series(symbol, series_for(timeframe))
            .await?;
        points.sort_by(|a, b| a.date.cmp(&b.date));

        let points = filter_timeframe(points, timeframe, Utc::now().date_naive());
        self.store.put_history(symbol, timeframe, &points)?;
        Ok(points)
    }

    /// Company overview for `symbol`, or a generic record if it cannot be fetched.
    pub async fn fetch_asset_metadata(&self, symbol: &str) -> AssetMetadata {
        let now = Utc::now().timestamp_millis();
        match self.store.get_metadata(symbol) {
            Ok(Some(cached)) if cached.is_fresh(self.metadata_ttl_secs, now) => {
                debug!("Using cached metadata for {}", symbol);
                return cached.value;
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to read cached metadata for {}: {}", symbol, e),
        }

        match self.source.overview(symbol).await {
            Ok(overview) => {
                let fetched_at = Utc::now();
                let metadata = AssetMetadata {
                    symbol: overview.symbol.clone().unwrap_or_else(|| symbol.to_string()),
                    name: overview.name.clone().unwrap_or_else(|| symbol.to_string()),
                    description: overview.description.clone().unwrap_or_default(),
                    sector: overview.sector.clone().unwrap_or_else(|| "Unknown".to_string()),
                    industry: overview.industry.clone().unwrap_or_else(|| "Unknown".to_string()),
                    instrument_type: "Stock".to_string(),
                    exchange: overview.exchange.clone().unwrap_or_else(|| "Unknown".to_string()),
                    market_cap: overview.market_cap(),
                    pe_ratio: overview.pe_ratio(),
                    timestamp: fetched_at.timestamp_millis(),
                    last_updated: fetched_at.to_rfc3339(),
                };
                if let Err(e) = self.store.put_metadata(&metadata) {
                    warn!("Failed to cache metadata for {}: {}", symbol, e);
                }
                metadata
            }
            Err(e) => {
                warn!("Error fetching metadata for {}: {}", symbol, e);
                AssetMetadata::fallback(symbol)
            }
        }
    }

    /// Quotes for the tracked market indices.
    pub async fn fetch_market_indices(&self) -> Vec<MarketIndex> {
        let quotes = join_all(
            MARKET_INDICES
                .iter()
                .map(|(symbol, _, _)| self.fetch_current_price(symbol)),
        )
        .await;

        MARKET_INDICES
            .iter()
            .zip(quotes)
            .map(|((symbol, name, _), quote)| MarketIndex {
                symbol: symbol.to_string(),
                name: name.to_string(),
                kind: "index".to_string(),
                price: Some(quote.price),
                change: Some(quote.change),
                change_percent: Some(quote.change_percent),
                error: false,
            })
            .collect()
    }

    /// Close series per index, keyed `sp500`, `nasdaq`, `dowJones`, `russell2000`.
    ///
    /// An index whose history cannot be fetched gets a simulated series.
    pub async fn fetch_market_indices_history(
        &self,
        timeframe: Timeframe,
    ) -> BTreeMap<String, Vec<IndexHistoryPoint>> {
        let results = join_all(
            MARKET_INDICES
                .iter()
                .map(|(symbol, _, _)| self.fetch_historical_data(symbol, timeframe)),
        )
        .await;

        let mut history = BTreeMap::new();
        for ((symbol, _, key), result) in MARKET_INDICES.iter().zip(results) {
            let series = match result {
                Ok(points) => points
                    .into_iter()
                    .map(|p| IndexHistoryPoint {
                        date: p.date,
                        value: p.close,
                    })
                    .collect(),
                Err(e) => {
                    warn!("Error fetching index history for {}: {}, using simulated data", symbol, e);
                    simulation::simulated_index_history(symbol, timeframe, &mut *self.rng())
                }
            };
            history.insert(key.to_string(), series);
        }
        history
    }

    /// Refresh quotes for a list of symbols in small batches.
    pub async fn update_watchlist(&self, symbols: &[String]) -> Vec<PriceQuote> {
        if symbols.is_empty() {
            return Vec::new();
        }

        let mut quotes = Vec::with_capacity(symbols.len());
        for (i, batch) in symbols.chunks(WATCHLIST_BATCH_SIZE).enumerate() {
            if i > 0 && !self.watchlist_pause.is_zero() {
                tokio::time::sleep(self.watchlist_pause).await;
            }
            let batch_quotes = join_all(batch.iter().map(|s| self.fetch_current_price(s))).await;
            quotes.extend(batch_quotes);
        }

        info!("Updated watchlist data for {} symbols", symbols.len());
        quotes
    }

    /// Every quote currently in the cache.
    pub fn all_cached_quotes(&self) -> Result<Vec<PriceQuote>> {
        self.store.all_quotes()
    }
}

/// Time series endpoint for a chart range.
pub fn series_for(timeframe: Timeframe) -> SeriesKind {
    match timeframe {
        Timeframe::OneDay => SeriesKind::Intraday15Min,
        Timeframe::OneWeek | Timeframe::OneMonth | Timeframe::ThreeMonths => SeriesKind::Daily,
        Timeframe::All => SeriesKind::Weekly,
    }
}

/// Trim sorted bars to the chart range ending at `today`.
pub fn filter_timeframe(
    points: Vec<HistoricalPoint>,
    timeframe: Timeframe,
    today: NaiveDate,
) -> Vec<HistoricalPoint> {
    match timeframe {
        Timeframe::OneDay => {
            let skip = points.len().saturating_sub(INTRADAY_POINTS);
            points.into_iter().skip(skip).collect()
        }
        Timeframe::All => points,
        other => {
            let days = other.lookback_days().unwrap_or(30);
            let cutoff = today - ChronoDuration::days(days);
            points
                .into_iter()
                .filter(|p| {
                    p.date
                        .get(..10)
                        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                        .map(|d| d >= cutoff)
                        .unwrap_or(false)
                })
                .collect()
        }
    }
}
