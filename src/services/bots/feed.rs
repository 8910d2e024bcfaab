//! Bot trade feed: on-demand snapshots and the continuous background stream.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use super::generator::BotTradeGenerator;
use super::market_state::MarketStateTracker;
use super::roster::{bot_traders, find_bot};
use crate::config::FeedConfig;
use crate::error::Result;
use crate::services::SqliteStore;
use crate::types::{
    BotTrader, FeedFrequency, MarketState, MarketTrend, Trade, TradingStyle, Volatility,
};

/// Stored bot trades considered for a snapshot.
const STREAM_HISTORY: usize = 50;

/// Trades returned by a snapshot.
const STREAM_LIMIT: usize = 30;

/// Ceiling on any bot's per-check trade probability.
const MAX_TRADE_PROBABILITY: f64 = 0.9;

/// Delay before the first continuous batch.
const FIRST_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Recent trades for `bot_ids` (every bot when empty) plus a few fresh ones.
pub async fn trade_stream(
    store: &SqliteStore,
    generator: &BotTradeGenerator,
    bot_ids: &[String],
    frequency: FeedFrequency,
) -> Result<Vec<Trade>> {
    let wanted = |id: &str| bot_ids.is_empty() || bot_ids.iter().any(|b| b == id);

    let mut trades: Vec<Trade> = store
        .recent_bot_trades(STREAM_HISTORY)?
        .into_iter()
        .filter(|t| wanted(&t.trader_id))
        .collect();

    let bots: Vec<BotTrader> = bot_traders().into_iter().filter(|b| wanted(&b.id)).collect();
    for bot in bots {
        let probability = (bot.trading_frequency * frequency.multiplier()).min(MAX_TRADE_PROBABILITY);
        if generator.roll() >= probability {
            continue;
        }
        match generator.generate_bot_trade(&bot.id, None).await {
            Ok(trade) => trades.push(trade),
            Err(e) => warn!("Error generating trade for bot {}: {}", bot.id, e),
        }
    }

    trades.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    trades.truncate(STREAM_LIMIT);
    Ok(trades)
}

/// How much more often a style trades in the current market.
pub fn market_multiplier(style: TradingStyle, state: &MarketState) -> f64 {
    match (style, state.market_trend, state.volatility) {
        (TradingStyle::Momentum, MarketTrend::Bullish, _) => 1.5,
        (TradingStyle::Value, MarketTrend::Bearish, _) => 1.3,
        (TradingStyle::Swing, _, Volatility::High) => 1.8,
        _ => 1.0,
    }
}

/// Scale applied to the batch size.
fn trade_count_multiplier(volatility: Volatility) -> f64 {
    match volatility {
        Volatility::High => 1.5,
        Volatility::Low => 0.7,
        Volatility::Medium => 1.0,
    }
}

/// Scale applied to the delay between batches.
fn interval_multiplier(volatility: Volatility) -> f64 {
    match volatility {
        Volatility::High => 0.7,
        Volatility::Low => 1.5,
        Volatility::Medium => 1.0,
    }
}

/// Bots favoured by the current trend.
fn trend_candidates(bots: &[BotTrader], trend: MarketTrend) -> Vec<&BotTrader> {
    bots.iter()
        .filter(|b| match trend {
            MarketTrend::Bullish => matches!(
                b.trading_style,
                TradingStyle::Momentum | TradingStyle::Growth
            ),
            MarketTrend::Bearish => b.trading_style == TradingStyle::Value,
            MarketTrend::Neutral => false,
        })
        .collect()
}

/// Runs the continuous bot feed and broadcasts every non-empty batch.
pub struct TradeFeedRunner {
    generator: Arc<BotTradeGenerator>,
    tracker: Arc<MarketStateTracker>,
    config: FeedConfig,
    bot_ids: Vec<String>,
    trades_tx: broadcast::Sender<Vec<Trade>>,
    shutdown_tx: broadcast::Sender<()>,
    rng: Mutex<StdRng>,
}

impl TradeFeedRunner {
    pub fn new(
        generator: Arc<BotTradeGenerator>,
        tracker: Arc<MarketStateTracker>,
        config: FeedConfig,
    ) -> Self {
        let (trades_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            generator,
            tracker,
            config,
            bot_ids: bot_traders().into_iter().map(|b| b.id).collect(),
            trades_tx,
            shutdown_tx,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Limit the feed to these bots.
    pub fn with_bots(mut self, bot_ids: Vec<String>) -> Self {
        self.bot_ids = bot_ids;
        self
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Receive every broadcast batch.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Trade>> {
        self.trades_tx.subscribe()
    }

    /// Loop until [`stop`](Self::stop) is called.
    pub async fn start(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut delay = FIRST_BATCH_DELAY;
        info!(
            "Bot trade feed started ({} bots, {:?} frequency)",
            self.bot_ids.len(),
            self.config.frequency
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    delay = match self.run_batch().await {
                        Ok(trades) => {
                            let next = self.next_delay(self.tracker.state().volatility);
                            debug!("Batch of {} trades, next in {:.1}s", trades.len(), next.as_secs_f64());
                            next
                        }
                        Err(e) => {
                            error!("Error in continuous trade stream: {}", e);
                            Duration::from_millis(self.config.max_interval_ms)
                        }
                    };
                }
                _ = shutdown_rx.recv() => {
                    info!("Bot trade feed received shutdown signal");
                    break;
                }
            }
        }
    }

    /// Cancel the pending batch and end [`start`](Self::start).
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Generate one batch and broadcast it if anything traded.
    pub async fn run_batch(&self) -> Result<Vec<Trade>> {
        let state = self.tracker.refresh().await;
        let selected = self.select_bots(&state);

        let mut trades = Vec::new();
        for bot_id in selected {
            match self.generator.generate_bot_trade(&bot_id, Some(&state)).await {
                Ok(trade) => trades.push(trade),
                Err(e) => warn!("Error generating trade for bot {}: {}", bot_id, e),
            }
        }

        if trades.is_empty() {
            debug!("No trades generated in this batch");
        } else {
            info!("Generated {} trades", trades.len());
            self.publish(&trades);
        }
        Ok(trades)
    }

    /// Push trades generated elsewhere to feed subscribers.
    pub fn publish(&self, trades: &[Trade]) {
        if trades.is_empty() {
            return;
        }
        // No receivers is fine.
        let _ = self.trades_tx.send(trades.to_vec());
    }

    /// Bots that trade this batch, one draw per slot.
    fn select_bots(&self, state: &MarketState) -> Vec<String> {
        let bots: Vec<BotTrader> = self.bot_ids.iter().filter_map(|id| find_bot(id)).collect();
        if bots.is_empty() {
            return Vec::new();
        }

        let max_trades = (self.config.max_trades.max(1) as f64
            * trade_count_multiplier(state.volatility))
        .ceil() as u32;
        let favoured = trend_candidates(&bots, state.market_trend);

        let mut rng = self.rng();
        let slots = rng.gen_range(1..=max_trades.max(1));
        debug!(
            "Generating batch of up to {} trades based on {:?} market",
            slots, state.market_trend
        );

        let mut selected = Vec::new();
        for _ in 0..slots {
            let bot = match favoured.choose(&mut *rng) {
                Some(bot) => *bot,
                None => match bots.choose(&mut *rng) {
                    Some(bot) => bot,
                    None => continue,
                },
            };
            let probability = (bot.trading_frequency
                * self.config.frequency.multiplier()
                * market_multiplier(bot.trading_style, state))
            .min(MAX_TRADE_PROBABILITY);
            if rng.gen::<f64>() < probability {
                selected.push(bot.id.clone());
            }
        }
        selected
    }

    /// Random delay before the next batch, scaled by volatility.
    pub fn next_delay(&self, volatility: Volatility) -> Duration {
        let scale = interval_multiplier(volatility);
        let min = (self.config.min_interval_ms as f64 * scale).floor() as u64;
        let max = (self.config.max_interval_ms as f64 * scale).floor() as u64;
        let ms = if max > min {
            self.rng().gen_range(min..max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }
}
