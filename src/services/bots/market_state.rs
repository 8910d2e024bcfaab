//! Coarse market mood used to steer the bot feed.

use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use super::roster::SECTOR_STOCKS;
use crate::services::MarketDataService;
use crate::types::{MarketIndex, MarketState, MarketTrend, SectorPerformance, Volatility};

/// Index move (percent) that counts as up or down.
const INDEX_MOVE_THRESHOLD: f64 = 0.2;

/// Indices that must agree before the trend leaves neutral.
const TREND_QUORUM: usize = 2;

pub struct MarketStateTracker {
    market: Arc<MarketDataService>,
    refresh_ms: i64,
    state: RwLock<MarketState>,
}

impl MarketStateTracker {
    pub fn new(market: Arc<MarketDataService>, refresh_secs: u64) -> Self {
        Self {
            market,
            refresh_ms: (refresh_secs as i64).saturating_mul(1000),
            state: RwLock::new(MarketState::default()),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> MarketState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Recompute the state unless it was refreshed within the window.
    pub async fn refresh(&self) -> MarketState {
        let now = chrono::Utc::now().timestamp_millis();
        let current = self.state();
        if let Some(last) = current.last_check {
            if now - last < self.refresh_ms {
                debug!("Market state is fresh, skipping refresh");
                return current;
            }
        }

        info!("Updating market state for bot trading...");
        let indices = self.market.fetch_market_indices().await;
        let sectors = self.sector_performance().await;

        let mut next = current;
        match assess_indices(&indices) {
            Some((trend, volatility)) => {
                next.market_trend = trend;
                next.volatility = volatility;
            }
            None => {
                warn!("No index data available, resetting market state");
                next.market_trend = MarketTrend::Neutral;
                next.volatility = Volatility::Medium;
            }
        }
        next.sector_performance.extend(sectors);
        next.last_check = Some(now);

        info!(
            "Market state updated: trend={:?} volatility={:?} sectors={}",
            next.market_trend,
            next.volatility,
            next.sector_performance.len()
        );

        *self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next.clone();
        next
    }

    async fn sector_performance(&self) -> HashMap<String, SectorPerformance> {
        let results = join_all(SECTOR_STOCKS.iter().map(|(sector, symbols)| async move {
            let quotes = join_all(symbols.iter().map(|s| self.market.fetch_current_price(s))).await;
            let changes: Vec<f64> = quotes.iter().map(|q| q.change_percent).collect();
            (sector.to_string(), average(&changes))
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(sector, avg)| avg.map(|c| (sector, SectorPerformance::from_change(c))))
            .collect()
    }
}

/// Trend and volatility from the index quotes, or `None` without data.
pub fn assess_indices(indices: &[MarketIndex]) -> Option<(MarketTrend, Volatility)> {
    let changes: Vec<f64> = indices
        .iter()
        .filter(|i| !i.error)
        .filter_map(|i| i.change_percent)
        .collect();
    if changes.is_empty() {
        return None;
    }

    let bullish = changes.iter().filter(|c| **c > INDEX_MOVE_THRESHOLD).count();
    let bearish = changes.iter().filter(|c| **c < -INDEX_MOVE_THRESHOLD).count();
    let trend = if bullish >= TREND_QUORUM {
        MarketTrend::Bullish
    } else if bearish >= TREND_QUORUM {
        MarketTrend::Bearish
    } else {
        MarketTrend::Neutral
    };

    let abs: Vec<f64> = changes.iter().map(|c| c.abs()).collect();
    let score = average(&abs).unwrap_or(0.0);
    let volatility = if score > 1.5 {
        Volatility::High
    } else if score < 0.5 {
        Volatility::Low
    } else {
        Volatility::Medium
    };

    Some((trend, volatility))
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
