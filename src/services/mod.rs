pub mod bots;
pub mod comments;
pub mod ledger;
pub mod market_data;
pub mod simulation;
pub mod sqlite_store;
pub mod traders;
pub mod trades;
pub mod users;

pub use bots::{BotTradeGenerator, MarketStateTracker, TradeFeedRunner};
pub use comments::CommentService;
pub use market_data::MarketDataService;
pub use sqlite_store::{Cached, SqliteStore};
pub use traders::TraderService;
pub use trades::TradeService;
pub use users::UserService;
