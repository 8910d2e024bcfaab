//! SQLite document store.
//!
//! Every collection is a table keyed by id with the record kept as a JSON
//! document in a TEXT column. The few fields that are filtered or sorted on
//! (trader, symbol, timestamp) are duplicated into plain columns. No foreign
//! keys: a trade may point at an original trade or trader that never existed.

use crate::error::Result;
use crate::types::{
    AssetMetadata, BotTrader, Comment, HistoricalPoint, Portfolio, PriceQuote, Timeframe, Trade,
    TraderDiscussion, UserProfile,
};
use rusqlite::{params, Connection, OptionalExtension, Params};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// A cached document and the time it was written (ms since epoch).
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub cached_at: i64,
}

impl<T> Cached<T> {
    /// True while the document is younger than `ttl_secs`.
    pub fn is_fresh(&self, ttl_secs: u64, now_ms: i64) -> bool {
        now_ms - self.cached_at < (ttl_secs as i64) * 1000
    }
}

/// SQLite store for all persisted documents.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    /// Open `path`, treating `:memory:` as an in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        if path == ":memory:" {
            Self::new_in_memory()
        } else {
            Self::new(path)
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-written row behind,
        // so a poisoned lock is still usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS traders (
                id TEXT PRIMARY KEY,
                is_bot INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                trader_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                is_bot INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_trader ON trades(trader_id, timestamp DESC);
            CREATE INDEX IF NOT EXISTS idx_trades_symbol ON trades(symbol, timestamp DESC);
            CREATE INDEX IF NOT EXISTS idx_trades_timestamp ON trades(timestamp DESC);

            CREATE TABLE IF NOT EXISTS portfolios (
                trader_id TEXT PRIMARY KEY,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                trade_id TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_trade ON comments(trade_id, timestamp DESC);

            CREATE TABLE IF NOT EXISTS discussions (
                id TEXT PRIMARY KEY,
                trader_id TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_discussions_trader ON discussions(trader_id, timestamp DESC);

            CREATE TABLE IF NOT EXISTS follows (
                user_id TEXT NOT NULL,
                trader_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, trader_id)
            );
            CREATE INDEX IF NOT EXISTS idx_follows_trader ON follows(trader_id);

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS market_data (
                symbol TEXT PRIMARY KEY,
                cached_at INTEGER NOT NULL,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS historical_data (
                cache_key TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                timeframe TEXT NOT NULL,
                cached_at INTEGER NOT NULL,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS asset_metadata (
                symbol TEXT PRIMARY KEY,
                cached_at INTEGER NOT NULL,
                doc TEXT NOT NULL
            );",
        )?;

        info!("SQLite schema initialized");
        Ok(())
    }

    // ========== Traders ==========

    /// Insert or replace a trader profile.
    pub fn upsert_trader(&self, trader: &BotTrader) -> Result<()> {
        let doc = serde_json::to_string(trader)?;
        self.conn().execute(
            "INSERT INTO traders (id, is_bot, created_at, doc) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                is_bot = excluded.is_bot,
                doc = excluded.doc",
            params![trader.id, trader.is_bot, trader.created_at, doc],
        )?;
        Ok(())
    }

    pub fn get_trader(&self, id: &str) -> Result<Option<BotTrader>> {
        get_doc(&self.conn(), "SELECT doc FROM traders WHERE id = ?1", params![id])
    }

    /// All bot profiles in seeding order.
    pub fn list_bot_traders(&self) -> Result<Vec<BotTrader>> {
        query_docs(
            &self.conn(),
            "SELECT doc FROM traders WHERE is_bot = 1 ORDER BY created_at, rowid",
            [],
        )
    }

    // ========== Trades ==========

    pub fn insert_trade(&self, trade: &Trade) -> Result<()> {
        let doc = serde_json::to_string(trade)?;
        self.conn().execute(
            "INSERT INTO trades (id, trader_id, symbol, is_bot, timestamp, doc)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                trade.id,
                trade.trader_id,
                trade.symbol,
                trade.is_bot,
                trade.timestamp,
                doc
            ],
        )?;
        debug!("Stored trade {} ({} {} {})", trade.id, trade.action, trade.quantity, trade.symbol);
        Ok(())
    }

    pub fn get_trade(&self, id: &str) -> Result<Option<Trade>> {
        get_doc(&self.conn(), "SELECT doc FROM trades WHERE id = ?1", params![id])
    }

    /// Trades placed by one trader, newest first.
    pub fn trades_by_trader(&self, trader_id: &str) -> Result<Vec<Trade>> {
        query_docs(
            &self.conn(),
            "SELECT doc FROM trades WHERE trader_id = ?1 ORDER BY timestamp DESC, rowid DESC",
            params![trader_id],
        )
    }

    /// Trades in one symbol, newest first.
    pub fn trades_by_symbol(&self, symbol: &str, limit: usize) -> Result<Vec<Trade>> {
        query_docs(
            &self.conn(),
            "SELECT doc FROM trades WHERE symbol = ?1
             ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
            params![symbol, limit as i64],
        )
    }

    /// Most recent bot trades, newest first.
    pub fn recent_bot_trades(&self, limit: usize) -> Result<Vec<Trade>> {
        query_docs(
            &self.conn(),
            "SELECT doc FROM trades WHERE is_bot = 1
             ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
            params![limit as i64],
        )
    }

    /// Most recent trades of anyone, newest first.
    pub fn recent_trades(&self, limit: usize) -> Result<Vec<Trade>> {
        query_docs(
            &self.conn(),
            "SELECT doc FROM trades ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
            params![limit as i64],
        )
    }

    pub fn trade_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM trades", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Portfolios ==========

    pub fn get_portfolio(&self, trader_id: &str) -> Result<Option<Portfolio>> {
        get_doc(
            &self.conn(),
            "SELECT doc FROM portfolios WHERE trader_id = ?1",
            params![trader_id],
        )
    }

    pub fn save_portfolio(&self, portfolio: &Portfolio) -> Result<()> {
        write_portfolio(&self.conn(), portfolio)
    }

    /// Read-modify-write a portfolio while holding the connection lock.
    ///
    /// `default` builds the portfolio when none is stored yet.
    pub fn update_portfolio<D, F>(&self, trader_id: &str, default: D, f: F) -> Result<Portfolio>
    where
        D: FnOnce() -> Portfolio,
        F: FnOnce(&mut Portfolio),
    {
        let conn = self.conn();
        let mut portfolio = get_doc::<Portfolio, _>(
            &conn,
            "SELECT doc FROM portfolios WHERE trader_id = ?1",
            params![trader_id],
        )?
        .unwrap_or_else(default);

        f(&mut portfolio);
        write_portfolio(&conn, &portfolio)?;
        Ok(portfolio)
    }

    // ========== Comments ==========

    pub fn insert_comment(&self, comment: &Comment) -> Result<()> {
        let doc = serde_json::to_string(comment)?;
        self.conn().execute(
            "INSERT INTO comments (id, trade_id, timestamp, doc) VALUES (?1, ?2, ?3, ?4)",
            params![comment.id, comment.trade_id, comment.timestamp, doc],
        )?;
        Ok(())
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<Comment>> {
        get_doc(&self.conn(), "SELECT doc FROM comments WHERE id = ?1", params![id])
    }

    /// Comments and replies on a trade, newest first.
    pub fn comments_for_trade(&self, trade_id: &str) -> Result<Vec<Comment>> {
        query_docs(
            &self.conn(),
            "SELECT doc FROM comments WHERE trade_id = ?1 ORDER BY timestamp DESC, rowid DESC",
            params![trade_id],
        )
    }

    /// Apply `f` to a stored comment atomically. `None` if it does not exist.
    pub fn update_comment<F>(&self, id: &str, f: F) -> Result<Option<Comment>>
    where
        F: FnOnce(&mut Comment),
    {
        let conn = self.conn();
        let Some(mut comment) =
            get_doc::<Comment, _>(&conn, "SELECT doc FROM comments WHERE id = ?1", params![id])?
        else {
            return Ok(None);
        };

        f(&mut comment);
        conn.execute(
            "UPDATE comments SET doc = ?1 WHERE id = ?2",
            params![serde_json::to_string(&comment)?, id],
        )?;
        Ok(Some(comment))
    }

    // ========== Discussions ==========

    pub fn insert_discussion(&self, discussion: &TraderDiscussion) -> Result<()> {
        let doc = serde_json::to_string(discussion)?;
        self.conn().execute(
            "INSERT INTO discussions (id, trader_id, timestamp, doc) VALUES (?1, ?2, ?3, ?4)",
            params![discussion.id, discussion.trader_id, discussion.timestamp, doc],
        )?;
        Ok(())
    }

    pub fn get_discussion(&self, id: &str) -> Result<Option<TraderDiscussion>> {
        get_doc(&self.conn(), "SELECT doc FROM discussions WHERE id = ?1", params![id])
    }

    /// Discussions on a trader's profile, newest first.
    pub fn discussions_for_trader(&self, trader_id: &str) -> Result<Vec<TraderDiscussion>> {
        query_docs(
            &self.conn(),
            "SELECT doc FROM discussions WHERE trader_id = ?1 ORDER BY timestamp DESC, rowid DESC",
            params![trader_id],
        )
    }

    /// Apply `f` to a stored discussion atomically. `None` if it does not exist.
    pub fn update_discussion<F>(&self, id: &str, f: F) -> Result<Option<TraderDiscussion>>
    where
        F: FnOnce(&mut TraderDiscussion),
    {
        let conn = self.conn();
        let Some(mut discussion) = get_doc::<TraderDiscussion, _>(
            &conn,
            "SELECT doc FROM discussions WHERE id = ?1",
            params![id],
        )?
        else {
            return Ok(None);
        };

        f(&mut discussion);
        conn.execute(
            "UPDATE discussions SET doc = ?1 WHERE id = ?2",
            params![serde_json::to_string(&discussion)?, id],
        )?;
        Ok(Some(discussion))
    }

    // ========== Follows ==========

    /// Returns `true` if the follow was new.
    pub fn follow(&self, user_id: &str, trader_id: &str) -> Result<bool> {
        let changed = self.conn().execute(
            "INSERT OR IGNORE INTO follows (user_id, trader_id, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, trader_id, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(changed > 0)
    }

    /// Returns `true` if a follow was removed.
    pub fn unfollow(&self, user_id: &str, trader_id: &str) -> Result<bool> {
        let changed = self.conn().execute(
            "DELETE FROM follows WHERE user_id = ?1 AND trader_id = ?2",
            params![user_id, trader_id],
        )?;
        Ok(changed > 0)
    }

    /// Trader ids a user follows, oldest follow first.
    pub fn following(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT trader_id FROM follows WHERE user_id = ?1 ORDER BY created_at, rowid",
        )?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    pub fn follower_count(&self, trader_id: &str) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM follows WHERE trader_id = ?1",
            params![trader_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ========== Users ==========

    pub fn save_user(&self, user: &UserProfile) -> Result<()> {
        let doc = serde_json::to_string(user)?;
        self.conn().execute(
            "INSERT INTO users (id, email, doc) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET email = excluded.email, doc = excluded.doc",
            params![user.id, user.email, doc],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserProfile>> {
        get_doc(&self.conn(), "SELECT doc FROM users WHERE id = ?1", params![id])
    }

    // ========== Market data caches ==========

    pub fn put_quote(&self, quote: &PriceQuote) -> Result<()> {
        self.put_quote_at(quote, chrono::Utc::now().timestamp_millis())
    }

    /// Cache a quote as if written at `cached_at`.
    pub fn put_quote_at(&self, quote: &PriceQuote, cached_at: i64) -> Result<()> {
        let doc = serde_json::to_string(quote)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO market_data (symbol, cached_at, doc) VALUES (?1, ?2, ?3)",
            params![quote.symbol, cached_at, doc],
        )?;
        Ok(())
    }

    pub fn get_quote(&self, symbol: &str) -> Result<Option<Cached<PriceQuote>>> {
        get_cached(
            &self.conn(),
            "SELECT doc, cached_at FROM market_data WHERE symbol = ?1",
            params![symbol],
        )
    }

    /// Every cached quote, by symbol.
    pub fn all_quotes(&self) -> Result<Vec<PriceQuote>> {
        query_docs(&self.conn(), "SELECT doc FROM market_data ORDER BY symbol", [])
    }

    pub fn put_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        points: &[HistoricalPoint],
    ) -> Result<()> {
        self.put_history_at(symbol, timeframe, points, chrono::Utc::now().timestamp_millis())
    }

    pub fn put_history_at(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        points: &[HistoricalPoint],
        cached_at: i64,
    ) -> Result<()> {
        let doc = serde_json::to_string(points)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO historical_data (cache_key, symbol, timeframe, cached_at, doc)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                history_key(symbol, timeframe),
                symbol,
                timeframe.as_str(),
                cached_at,
                doc
            ],
        )?;
        Ok(())
    }

    pub fn get_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<Cached<Vec<HistoricalPoint>>>> {
        get_cached(
            &self.conn(),
            "SELECT doc, cached_at FROM historical_data WHERE cache_key = ?1",
            params![history_key(symbol, timeframe)],
        )
    }

    pub fn put_metadata(&self, metadata: &AssetMetadata) -> Result<()> {
        let doc = serde_json::to_string(metadata)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO asset_metadata (symbol, cached_at, doc) VALUES (?1, ?2, ?3)",
            params![metadata.symbol, chrono::Utc::now().timestamp_millis(), doc],
        )?;
        Ok(())
    }

    pub fn get_metadata(&self, symbol: &str) -> Result<Option<Cached<AssetMetadata>>> {
        get_cached(
            &self.conn(),
            "SELECT doc, cached_at FROM asset_metadata WHERE symbol = ?1",
            params![symbol],
        )
    }
}

/// Cache key for a price history document, e.g. `AAPL_1month`.
pub fn history_key(symbol: &str, timeframe: Timeframe) -> String {
    format!("{}_{}", symbol, timeframe.as_str())
}

fn write_portfolio(conn: &Connection, portfolio: &Portfolio) -> Result<()> {
    let doc = serde_json::to_string(portfolio)?;
    conn.execute(
        "INSERT OR REPLACE INTO portfolios (trader_id, doc) VALUES (?1, ?2)",
        params![portfolio.trader_id, doc],
    )?;
    Ok(())
}

fn get_doc<T: DeserializeOwned, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Option<T>> {
    let doc: Option<String> = conn.query_row(sql, params, |row| row.get(0)).optional()?;
    match doc {
        Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
        None => Ok(None),
    }
}

fn query_docs<T: DeserializeOwned, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(serde_json::from_str(&row?)?);
    }
    Ok(docs)
}

fn get_cached<T: DeserializeOwned, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<Cached<T>>> {
    let row: Option<(String, i64)> = conn
        .query_row(sql, params, |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?;
    match row {
        Some((doc, cached_at)) => Ok(Some(Cached {
            value: serde_json::from_str(&doc)?,
            cached_at,
        })),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TradeAction, TraderIdentity};

    fn identity(id: &str) -> TraderIdentity {
        TraderIdentity {
            id: id.to_string(),
            name: id.to_string(),
            avatar: String::new(),
        }
    }

    fn trade_at(trader: &str, symbol: &str, timestamp: i64) -> Trade {
        let mut trade = Trade::new(&identity(trader), symbol, TradeAction::Buy, 10.0, 1);
        trade.timestamp = timestamp;
        trade
    }

    // =========================================================================
    // Trade Tests
    // =========================================================================

    #[test]
    fn test_trade_round_trip() {
        let store = SqliteStore::new_in_memory().unwrap();
        let trade = trade_at("user123", "AAPL", 1_000);
        store.insert_trade(&trade).unwrap();

        assert_eq!(store.get_trade(&trade.id).unwrap(), Some(trade));
        assert!(store.get_trade("missing").unwrap().is_none());
        assert_eq!(store.trade_count().unwrap(), 1);
    }

    #[test]
    fn test_trade_queries_newest_first() {
        let store = SqliteStore::new_in_memory().unwrap();
        store.insert_trade(&trade_at("user123", "AAPL", 1_000)).unwrap();
        store.insert_trade(&trade_at("user123", "MSFT", 3_000)).unwrap();
        store.insert_trade(&trade_at("other", "AAPL", 2_000)).unwrap();

        let mine = store.trades_by_trader("user123").unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].symbol, "MSFT");

        let apple = store.trades_by_symbol("AAPL", 10).unwrap();
        assert_eq!(apple.len(), 2);
        assert_eq!(apple[0].trader_id, "other");

        assert_eq!(store.trades_by_symbol("AAPL", 1).unwrap().len(), 1);
        assert_eq!(store.recent_trades(2).unwrap()[1].timestamp, 2_000);
    }

    #[test]
    fn test_recent_bot_trades_filters_users() {
        let store = SqliteStore::new_in_memory().unwrap();
        let mut bot = trade_at("bot-swing-sam", "JPM", 5_000);
        bot.is_bot = true;
        store.insert_trade(&bot).unwrap();
        store.insert_trade(&trade_at("user123", "JPM", 6_000)).unwrap();

        let bots = store.recent_bot_trades(50).unwrap();
        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].trader_id, "bot-swing-sam");
    }

    // =========================================================================
    // Portfolio Tests
    // =========================================================================

    #[test]
    fn test_update_portfolio_creates_from_default() {
        let store = SqliteStore::new_in_memory().unwrap();
        assert!(store.get_portfolio("user123").unwrap().is_none());

        let updated = store
            .update_portfolio("user123", || Portfolio::with_cash("user123", 1_000.0), |p| {
                p.cash -= 100.0;
            })
            .unwrap();
        assert_eq!(updated.cash, 900.0);

        let again = store
            .update_portfolio("user123", || Portfolio::with_cash("user123", 1_000.0), |p| {
                p.cash -= 100.0;
            })
            .unwrap();
        assert_eq!(again.cash, 800.0);
        assert_eq!(store.get_portfolio("user123").unwrap().unwrap().cash, 800.0);
    }

    // =========================================================================
    // Comment / Discussion Tests
    // =========================================================================

    #[test]
    fn test_update_comment_missing() {
        let store = SqliteStore::new_in_memory().unwrap();
        let result = store.update_comment("nope", |_| {}).unwrap();
        assert!(result.is_none());
    }

    // =========================================================================
    // Follow Tests
    // =========================================================================

    #[test]
    fn test_follow_is_idempotent() {
        let store = SqliteStore::new_in_memory().unwrap();
        assert!(store.follow("user123", "bot-dca-deb").unwrap());
        assert!(!store.follow("user123", "bot-dca-deb").unwrap());
        assert!(store.follow("user456", "bot-dca-deb").unwrap());

        assert_eq!(store.follower_count("bot-dca-deb").unwrap(), 2);
        assert_eq!(store.following("user123").unwrap(), vec!["bot-dca-deb"]);

        assert!(store.unfollow("user123", "bot-dca-deb").unwrap());
        assert!(!store.unfollow("user123", "bot-dca-deb").unwrap());
        assert_eq!(store.follower_count("bot-dca-deb").unwrap(), 1);
    }

    // =========================================================================
    // Cache Tests
    // =========================================================================

    #[test]
    fn test_quote_cache_age() {
        let store = SqliteStore::new_in_memory().unwrap();
        let quote = PriceQuote {
            symbol: "KO".to_string(),
            price: 60.0,
            change: 0.5,
            change_percent: 0.84,
            volume: 1_000,
            timestamp: 0,
            last_updated: "2024-01-15T00:00:00Z".to_string(),
            simulated: false,
        };
        store.put_quote_at(&quote, 10_000).unwrap();

        let cached = store.get_quote("KO").unwrap().unwrap();
        assert_eq!(cached.value, quote);
        assert!(cached.is_fresh(900, 10_000 + 899_999));
        assert!(!cached.is_fresh(900, 10_000 + 900_000));
        assert_eq!(store.all_quotes().unwrap().len(), 1);
    }

    #[test]
    fn test_history_cache_keyed_by_timeframe() {
        let store = SqliteStore::new_in_memory().unwrap();
        let points = vec![HistoricalPoint {
            date: "2024-01-15".to_string(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10,
        }];
        store.put_history("AAPL", Timeframe::OneWeek, &points).unwrap();

        assert!(store.get_history("AAPL", Timeframe::OneMonth).unwrap().is_none());
        let cached = store.get_history("AAPL", Timeframe::OneWeek).unwrap().unwrap();
        assert_eq!(cached.value, points);
        assert_eq!(history_key("AAPL", Timeframe::OneWeek), "AAPL_1week");
    }
}
