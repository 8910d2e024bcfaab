//! Bot trader profiles, their portfolios and who follows them.

use std::sync::Arc;
use tracing::{debug, info};

use super::bots::bot_traders;
use super::SqliteStore;
use crate::error::{AppError, Result};
use crate::types::{BotTrader, Portfolio, Trade};

pub struct TraderService {
    store: Arc<SqliteStore>,
}

impl TraderService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Store any missing bot profile along with an untouched portfolio.
    ///
    /// Returns how many bots were created. Safe to call on every boot.
    pub fn initialize_bot_traders(&self) -> Result<usize> {
        let mut created = 0;
        for bot in bot_traders() {
            if self.store.get_trader(&bot.id)?.is_some() {
                debug!("Bot trader {} already exists", bot.id);
                continue;
            }
            self.store.upsert_trader(&bot)?;
            if self.store.get_portfolio(&bot.id)?.is_none() {
                self.store
                    .save_portfolio(&Portfolio::with_cash(&bot.id, bot.initial_capital))?;
            }
            info!("Created bot trader: {}", bot.name);
            created += 1;
        }
        Ok(created)
    }

    /// Every bot, with live follower counts.
    pub fn list_bot_traders(&self) -> Result<Vec<BotTrader>> {
        self.store
            .list_bot_traders()?
            .into_iter()
            .map(|t| self.with_followers(t))
            .collect()
    }

    pub fn get_trader(&self, id: &str) -> Result<BotTrader> {
        let trader = self
            .store
            .get_trader(id)?
            .ok_or_else(|| AppError::NotFound(format!("Trader {} not found", id)))?;
        self.with_followers(trader)
    }

    /// A bot's portfolio, or its starting position if it never traded.
    pub fn bot_portfolio(&self, id: &str) -> Result<Portfolio> {
        let trader = self.get_trader(id)?;
        Ok(self
            .store
            .get_portfolio(id)?
            .unwrap_or_else(|| Portfolio::with_cash(&trader.id, trader.initial_capital)))
    }

    /// A trader's trades, newest first.
    pub fn trader_trades(&self, id: &str) -> Result<Vec<Trade>> {
        self.store.trades_by_trader(id)
    }

    /// Returns `true` if this created a new follow.
    pub fn follow(&self, user_id: &str, trader_id: &str) -> Result<bool> {
        self.get_trader(trader_id)?;
        let created = self.store.follow(user_id, trader_id)?;
        if created {
            info!("User {} followed {}", user_id, trader_id);
        }
        Ok(created)
    }

    /// Returns `true` if a follow was removed.
    pub fn unfollow(&self, user_id: &str, trader_id: &str) -> Result<bool> {
        self.store.unfollow(user_id, trader_id)
    }

    /// Traders `user_id` follows, oldest follow first. Unknown ids are skipped.
    pub fn following(&self, user_id: &str) -> Result<Vec<BotTrader>> {
        let mut traders = Vec::new();
        for id in self.store.following(user_id)? {
            if let Some(trader) = self.store.get_trader(&id)? {
                traders.push(self.with_followers(trader)?);
            }
        }
        Ok(traders)
    }

    fn with_followers(&self, mut trader: BotTrader) -> Result<BotTrader> {
        trader.followers += self.store.follower_count(&trader.id)?;
        Ok(trader)
    }
}
