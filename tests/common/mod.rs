//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use copyfeed::config::Config;
use copyfeed::services::SqliteStore;
use copyfeed::sources::{
    CompanyOverview, GlobalQuote, QuoteError, QuoteFuture, QuoteSource, SeriesKind,
};
use copyfeed::types::HistoricalPoint;
use copyfeed::AppState;

/// Quote source that answers every symbol with the same numbers.
///
/// `None` for the price makes every call fail as if the network was down.
/// Every lookup is counted, answered or not.
pub struct ScriptedSource {
    pub price: Option<f64>,
    pub change_percent: f64,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn offline() -> Self {
        Self {
            price: None,
            change_percent: 0.0,
            calls: Arc::default(),
        }
    }

    pub fn flat(price: f64, change_percent: f64) -> Self {
        Self {
            price: Some(price),
            change_percent,
            calls: Arc::default(),
        }
    }

    /// Shared call counter; stays readable after the source moves into state.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn offline<T>() -> Result<T, QuoteError> {
    Err(QuoteError::Transport("offline".to_string()))
}

impl QuoteSource for ScriptedSource {
    fn global_quote<'a>(&'a self, symbol: &'a str) -> QuoteFuture<'a, GlobalQuote> {
        self.record_call();
        let result = self.price.map(|price| GlobalQuote {
            symbol: symbol.to_string(),
            price: format!("{:.4}", price),
            volume: "1000".to_string(),
            change: "0.0000".to_string(),
            change_percent: format!("{:.4}%", self.change_percent),
        });
        Box::pin(async move { result.map_or_else(offline, Ok) })
    }

    fn time_series<'a>(
        &'a self,
        _symbol: &'a str,
        _series: SeriesKind,
    ) -> QuoteFuture<'a, Vec<HistoricalPoint>> {
        self.record_call();
        let result = self.price.map(|price| {
            (1..=5)
                .map(|day| HistoricalPoint {
                    date: format!("2099-01-0{}", day),
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume: 100,
                })
                .collect::<Vec<_>>()
        });
        Box::pin(async move { result.map_or_else(offline, Ok) })
    }

    fn overview<'a>(&'a self, symbol: &'a str) -> QuoteFuture<'a, CompanyOverview> {
        self.record_call();
        let result = self.price.map(|_| CompanyOverview {
            symbol: Some(symbol.to_string()),
            name: Some(format!("{} Corp", symbol)),
            sector: Some("Technology".to_string()),
            market_cap: Some("1000000".to_string()),
            ..CompanyOverview::default()
        });
        Box::pin(async move { result.map_or_else(offline, Ok) })
    }
}

/// Application state over an in-memory store with the bots seeded.
pub fn test_state(source: ScriptedSource) -> AppState {
    test_state_with(Config::for_tests(), source)
}

pub fn test_state_with(config: Config, source: ScriptedSource) -> AppState {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let state = AppState::new(config, store, Arc::new(source));
    state.traders.initialize_bot_traders().unwrap();
    state
}
