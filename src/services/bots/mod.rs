//! Simulated bot traders.
//!
//! Everything in this module produces demo data: the personas, their trades
//! and the market mood that steers them.

pub mod feed;
pub mod generator;
pub mod market_state;
pub mod roster;

pub use feed::{market_multiplier, trade_stream, TradeFeedRunner};
pub use generator::BotTradeGenerator;
pub use market_state::{assess_indices, MarketStateTracker};
pub use roster::{
    bot_ids, bot_traders, find_bot, stock_info, stocks_in_sectors, POPULAR_STOCKS, SECTOR_STOCKS,
};
