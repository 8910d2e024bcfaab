//! Synthetic trade generation for the bot personas.
//!
//! Each persona picks a stock from its preferred sectors, decides a direction
//! the way its trading style would and sizes the position from its risk
//! tolerance. Generated trades are written to the store and applied to the
//! bot's portfolio like any other trade. This is demo data, not advice.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::roster::{bot_traders, find_bot, stocks_in_sectors, POPULAR_STOCKS};
use crate::error::{AppError, Result};
use crate::services::ledger::apply_bot_trade;
use crate::services::simulation;
use crate::services::{MarketDataService, SqliteStore};
use crate::types::{
    BotTrader, HistoricalPoint, MarketState, Portfolio, StockInfo, Timeframe, Trade, TradeAction,
    TraderIdentity, TradingStyle,
};

/// Stocks a momentum bot inspects before giving up.
const MOMENTUM_CANDIDATES: usize = 3;

/// Stock, direction and price chosen by a trading style.
#[derive(Debug, Clone)]
struct Decision {
    stock: StockInfo,
    action: TradeAction,
    price: f64,
    rationale: String,
    history: Option<Vec<HistoricalPoint>>,
}

impl Decision {
    fn new(stock: StockInfo, action: TradeAction, price: f64, rationale: String) -> Self {
        Self {
            stock,
            action,
            price,
            rationale,
            history: None,
        }
    }
}

pub struct BotTradeGenerator {
    store: Arc<SqliteStore>,
    market: Arc<MarketDataService>,
    rng: Mutex<StdRng>,
}

impl BotTradeGenerator {
    pub fn new(store: Arc<SqliteStore>, market: Arc<MarketDataService>) -> Self {
        Self {
            store,
            market,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Use a fixed seed for every random choice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    // Never hold this guard across an await.
    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Uniform draw in [0, 1).
    pub(crate) fn roll(&self) -> f64 {
        self.rng().gen::<f64>()
    }

    /// Generate, store and book one trade for `bot_id`.
    ///
    /// A market state, when given, reorders the candidate stocks by how their
    /// sector moved today.
    pub async fn generate_bot_trade(
        &self,
        bot_id: &str,
        market_state: Option<&MarketState>,
    ) -> Result<Trade> {
        let bot = find_bot(bot_id)
            .ok_or_else(|| AppError::NotFound(format!("Bot {} not found", bot_id)))?;

        let mut eligible = stocks_in_sectors(&bot.sector_preferences);
        if eligible.is_empty() {
            eligible = POPULAR_STOCKS.to_vec();
        }
        let ranked = prioritize(&mut eligible, bot.trading_style, market_state);

        let decision = match self.decide(&bot, &eligible, ranked).await {
            Some(decision) => decision,
            None => self.fallback_decision(&eligible).await,
        };
        let price = self.usable_price(&decision.stock, decision.price);

        let portfolio = self.store.get_portfolio(&bot.id)?;
        let quantity = self.position_size(&bot, portfolio.as_ref(), decision.action, price);
        let gain = self.simulated_gain(decision.history.as_deref(), decision.action);

        let identity = TraderIdentity {
            id: bot.id.clone(),
            name: bot.name.clone(),
            avatar: bot.avatar.clone(),
        };
        let mut trade = Trade::new(&identity, decision.stock.symbol, decision.action, price, quantity);
        trade.rationale = Some(decision.rationale);
        trade.trading_style = Some(bot.trading_style);
        trade.sector = Some(decision.stock.sector.to_string());
        trade.gain = Some(gain);
        trade.is_bot = true;

        self.store.insert_trade(&trade)?;
        self.store.update_portfolio(
            &bot.id,
            || Portfolio::with_cash(&bot.id, bot.initial_capital),
            |p| apply_bot_trade(p, &trade, &bot),
        )?;

        info!(
            "Generated {} trade for {}: {} shares of {} @ ${:.2}",
            trade.action, bot.name, trade.quantity, trade.symbol, trade.price
        );
        Ok(trade)
    }

    /// Give every bot one chance to trade, weighted by its trading frequency.
    pub async fn generate_bot_trades(&self) -> Result<Vec<Trade>> {
        let mut trades = Vec::new();
        for bot in bot_traders() {
            if self.roll() >= bot.trading_frequency {
                continue;
            }
            match self.generate_bot_trade(&bot.id, None).await {
                Ok(trade) => trades.push(trade),
                Err(e) => warn!("Error generating trade for bot {}: {}", bot.id, e),
            }
        }
        debug!("Generated {} bot trades", trades.len());
        Ok(trades)
    }

    async fn decide(
        &self,
        bot: &BotTrader,
        eligible: &[StockInfo],
        ranked: bool,
    ) -> Option<Decision> {
        match bot.trading_style {
            TradingStyle::Momentum => self.decide_momentum(eligible, ranked).await,
            TradingStyle::Value => self.decide_value(eligible, ranked).await,
            TradingStyle::Swing => self.decide_swing(eligible, ranked).await,
            TradingStyle::Growth => self.decide_growth(eligible).await,
        }
    }

    async fn decide_momentum(&self, eligible: &[StockInfo], ranked: bool) -> Option<Decision> {
        for _ in 0..MOMENTUM_CANDIDATES.min(eligible.len()) {
            let stock = self.pick(eligible, ranked)?;
            let quote = self.market.fetch_current_price(stock.symbol).await;
            if quote.change_percent > 0.5 {
                let rationale = format!(
                    "{} shows strong upward momentum with a {:.2}% gain and increasing volume",
                    stock.symbol, quote.change_percent
                );
                return Some(Decision::new(stock, TradeAction::Buy, quote.price, rationale));
            }
        }
        None
    }

    async fn decide_value(&self, eligible: &[StockInfo], ranked: bool) -> Option<Decision> {
        let stock = self.pick(eligible, ranked)?;
        let metadata = self.market.fetch_asset_metadata(stock.symbol).await;
        let quote = self.market.fetch_current_price(stock.symbol).await;

        let (action, rationale) = match metadata.pe_ratio {
            Some(pe) if pe < 20.0 => (
                TradeAction::Buy,
                format!(
                    "{} is trading at an attractive P/E ratio of {} with strong fundamentals",
                    stock.symbol, pe
                ),
            ),
            _ if quote.change_percent < -1.0 => (
                TradeAction::Buy,
                format!(
                    "{} is down {:.2}%, presenting a value opportunity for a quality company",
                    stock.symbol,
                    quote.change_percent.abs()
                ),
            ),
            _ => (
                TradeAction::Sell,
                format!(
                    "{} appears to be trading above its intrinsic value, taking profits",
                    stock.symbol
                ),
            ),
        };
        Some(Decision::new(stock, action, quote.price, rationale))
    }

    async fn decide_swing(&self, eligible: &[StockInfo], ranked: bool) -> Option<Decision> {
        let stock = self.pick(eligible, ranked)?;
        let quote = self.market.fetch_current_price(stock.symbol).await;

        match self
            .market
            .fetch_historical_data(stock.symbol, Timeframe::OneWeek)
            .await
        {
            Ok(history) => {
                let uptrend = recent_uptrend(&history);
                let action = if uptrend { TradeAction::Buy } else { TradeAction::Sell };
                let reversal = (uptrend && quote.change_percent < -1.5)
                    || (!uptrend && quote.change_percent > 1.5);

                let rationale = if reversal {
                    let (level, move_) = if uptrend {
                        ("support", "bounce")
                    } else {
                        ("resistance", "pullback")
                    };
                    format!(
                        "Technical indicators suggest {} is at a key {} level with potential for a short-term {}",
                        stock.symbol, level, move_
                    )
                } else {
                    format!(
                        "{} is showing a strong {} trend in the short term",
                        stock.symbol,
                        if uptrend { "upward" } else { "downward" }
                    )
                };

                let mut decision = Decision::new(stock, action, quote.price, rationale);
                decision.history = Some(history);
                Some(decision)
            }
            Err(e) => {
                warn!("Error fetching history for {}: {}", stock.symbol, e);
                let (price, buy) = {
                    let mut rng = self.rng();
                    (
                        simulation::base_price_or_random(stock.symbol, &mut *rng),
                        rng.gen_bool(0.5),
                    )
                };
                let (action, level) = if buy {
                    (TradeAction::Buy, "support")
                } else {
                    (TradeAction::Sell, "resistance")
                };
                let rationale = format!(
                    "Technical indicators suggest {} is at a key {} level",
                    stock.symbol, level
                );
                Some(Decision::new(stock, action, price, rationale))
            }
        }
    }

    async fn decide_growth(&self, eligible: &[StockInfo]) -> Option<Decision> {
        let stock = match eligible.iter().find(|s| s.sector == "Technology") {
            Some(stock) => *stock,
            None => self.pick(eligible, false)?,
        };
        let quote = self.market.fetch_current_price(stock.symbol).await;

        let (action, rationale) = if self.roll() < 0.3 {
            (
                TradeAction::Sell,
                format!(
                    "Taking profits on {} after strong performance to reinvest in new opportunities",
                    stock.symbol
                ),
            )
        } else {
            (
                TradeAction::Buy,
                format!(
                    "{} has strong growth potential with innovative products and expanding market share",
                    stock.symbol
                ),
            )
        };
        Some(Decision::new(stock, action, quote.price, rationale))
    }

    /// Random stock, current price, mostly buys.
    async fn fallback_decision(&self, eligible: &[StockInfo]) -> Decision {
        let stock = self
            .pick(eligible, false)
            .unwrap_or(POPULAR_STOCKS[0]);
        let quote = self.market.fetch_current_price(stock.symbol).await;

        let (action, rationale) = if self.roll() < 0.7 {
            (TradeAction::Buy, format!("{} presents an opportunity", stock.symbol))
        } else {
            (TradeAction::Sell, format!("{} has reached a target price", stock.symbol))
        };
        Decision::new(stock, action, quote.price, rationale)
    }

    /// Pick a candidate. Ranked lists draw from their top half.
    fn pick(&self, stocks: &[StockInfo], ranked: bool) -> Option<StockInfo> {
        let pool = if ranked {
            &stocks[..stocks.len().div_ceil(2)]
        } else {
            stocks
        };
        pool.choose(&mut *self.rng()).copied()
    }

    fn usable_price(&self, stock: &StockInfo, price: f64) -> f64 {
        if price.is_finite() && price > 0.0 {
            price
        } else {
            debug!("Unusable price {} for {}, jittering base price", price, stock.symbol);
            simulation::jittered_price(stock.symbol, &mut *self.rng())
        }
    }

    fn position_size(
        &self,
        bot: &BotTrader,
        portfolio: Option<&Portfolio>,
        action: TradeAction,
        price: f64,
    ) -> u64 {
        let cash = match portfolio {
            Some(p) if p.cash > 0.0 => p.cash,
            _ => bot.initial_capital,
        };
        let quantity = match action {
            TradeAction::Buy => (cash * bot.risk_tolerance.buy_fraction() / price).floor() as u64,
            TradeAction::Sell => {
                let (low, high) = bot.risk_tolerance.sell_range();
                self.rng().gen_range(low..=high)
            }
        };
        quantity.max(1)
    }

    fn simulated_gain(&self, history: Option<&[HistoricalPoint]>, action: TradeAction) -> f64 {
        let mut rng = self.rng();
        if let Some(avg) = history.and_then(average_recent_change) {
            let gain = avg * rng.gen_range(0.5..1.5);
            if gain.is_finite() {
                return gain;
            }
        }
        let offset = match action {
            TradeAction::Sell => 1.0,
            TradeAction::Buy => 0.5,
        };
        rng.gen_range(0.0..4.0) - offset
    }
}

/// Order `stocks` by how their sector moved, best fit for `style` first.
///
/// Returns whether an ordering was applied.
fn prioritize(stocks: &mut [StockInfo], style: TradingStyle, state: Option<&MarketState>) -> bool {
    let sectors = match state {
        Some(state) if !state.sector_performance.is_empty() => &state.sector_performance,
        _ => return false,
    };
    let change = |s: &StockInfo| sectors.get(s.sector).map(|p| p.change);

    // Stocks from sectors without data sort last.
    let key = |s: &StockInfo| -> Option<f64> {
        change(s).map(|c| match style {
            TradingStyle::Momentum => -c,
            TradingStyle::Value => c,
            TradingStyle::Swing => -c.abs(),
            TradingStyle::Growth => 0.0,
        })
    };

    stocks.sort_by(|a, b| match (key(a), key(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    true
}

/// Whether the last close is above the close two bars earlier.
fn recent_uptrend(history: &[HistoricalPoint]) -> bool {
    let n = history.len();
    if n > 3 {
        history[n - 1].close > history[n - 3].close
    } else {
        true
    }
}

/// Mean percent change across the last five closes.
fn average_recent_change(history: &[HistoricalPoint]) -> Option<f64> {
    if history.len() <= 5 {
        return None;
    }
    let recent = &history[history.len() - 5..];
    let total: f64 = recent
        .windows(2)
        .map(|w| (w[1].close - w[0].close) / w[0].close * 100.0)
        .sum();
    Some(total / (recent.len() - 1) as f64)
}
