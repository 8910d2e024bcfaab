//! User-entered trades and copy trades.

use std::sync::Arc;
use tracing::info;

use super::ledger::apply_trade;
use super::SqliteStore;
use crate::error::{AppError, Result};
use crate::types::{NewTradeRequest, Portfolio, Trade, TraderIdentity};

/// Default number of trades returned for a symbol.
pub const SYMBOL_TRADES_LIMIT: usize = 10;

/// Rejection message for an incomplete trade form.
pub const MISSING_FIELDS: &str = "Please fill in all required fields";

pub struct TradeService {
    store: Arc<SqliteStore>,
    starting_cash: f64,
}

impl TradeService {
    pub fn new(store: Arc<SqliteStore>, starting_cash: f64) -> Self {
        Self {
            store,
            starting_cash,
        }
    }

    /// Record a trade from the trade form and book it.
    pub fn create_user_trade(&self, user: &TraderIdentity, form: NewTradeRequest) -> Result<Trade> {
        let symbol = form.symbol.trim().to_uppercase();
        let quantity = u64::try_from(form.quantity).unwrap_or(0);
        if symbol.is_empty() || quantity == 0 || !(form.price.is_finite() && form.price > 0.0) {
            return Err(AppError::BadRequest(MISSING_FIELDS.to_string()));
        }

        let mut trade = Trade::new(user, symbol, form.action, form.price, quantity);
        trade.rationale = form
            .rationale
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        self.book(&trade)?;
        info!(
            "{} placed {} {} x{} @ ${:.2}",
            user.id, trade.action, trade.symbol, trade.quantity, trade.price
        );
        Ok(trade)
    }

    /// Mirror someone else's trade into the user's portfolio.
    pub fn create_copy_trade(&self, user: &TraderIdentity, original_trade_id: &str) -> Result<Trade> {
        let original = self.get_trade(original_trade_id)?;

        let mut trade = Trade::new(
            user,
            original.symbol.clone(),
            original.action,
            original.price,
            original.quantity,
        );
        trade.rationale = Some(format!("Copied trade from {}", original.trader_name));
        trade.is_copy = true;
        trade.original_trade_id = Some(original.id.clone());
        trade.original_trader_id = Some(original.trader_id.clone());

        self.book(&trade)?;
        info!(
            "{} copied trade {} from {}",
            user.id, original.id, original.trader_name
        );
        Ok(trade)
    }

    pub fn get_trade(&self, id: &str) -> Result<Trade> {
        self.store
            .get_trade(id)?
            .ok_or_else(|| AppError::NotFound(format!("Trade {} not found", id)))
    }

    /// A user's trades, newest first.
    pub fn user_trades(&self, user_id: &str) -> Result<Vec<Trade>> {
        self.store.trades_by_trader(user_id)
    }

    /// Latest trades in `symbol` by anyone.
    pub fn symbol_trades(&self, symbol: &str, limit: usize) -> Result<Vec<Trade>> {
        self.store.trades_by_symbol(&symbol.to_uppercase(), limit)
    }

    /// Latest trades by anyone.
    pub fn recent_trades(&self, limit: usize) -> Result<Vec<Trade>> {
        self.store.recent_trades(limit)
    }

    /// The user's portfolio, or an untouched one with the starting cash.
    pub fn portfolio(&self, user_id: &str) -> Result<Portfolio> {
        Ok(self
            .store
            .get_portfolio(user_id)?
            .unwrap_or_else(|| Portfolio::with_cash(user_id, self.starting_cash)))
    }

    fn book(&self, trade: &Trade) -> Result<()> {
        self.store.insert_trade(trade)?;
        self.store.update_portfolio(
            &trade.trader_id,
            || Portfolio::with_cash(&trade.trader_id, self.starting_cash),
            |p| apply_trade(p, trade),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TradeAction;

    fn user() -> TraderIdentity {
        TraderIdentity {
            id: "user123".to_string(),
            name: "Demo User".to_string(),
            avatar: String::new(),
        }
    }

    fn form(symbol: &str, action: TradeAction, quantity: i64, price: f64) -> NewTradeRequest {
        NewTradeRequest {
            symbol: symbol.to_string(),
            action,
            quantity,
            price,
            rationale: None,
        }
    }

    fn service() -> (TradeService, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        (TradeService::new(store.clone(), 100_000.0), store)
    }

    // =========================================================================
    // User trade Tests
    // =========================================================================

    #[test]
    fn test_user_trade_books_portfolio() {
        let (service, store) = service();
        let trade = service
            .create_user_trade(&user(), form(" aapl ", TradeAction::Buy, 10, 150.0))
            .unwrap();

        assert_eq!(trade.symbol, "AAPL");
        assert_eq!(trade.value, 1_500.0);
        assert!(!trade.is_bot);
        assert_eq!(store.trade_count().unwrap(), 1);

        let portfolio = service.portfolio("user123").unwrap();
        assert_eq!(portfolio.cash, 98_500.0);
        assert_eq!(portfolio.holding("AAPL").unwrap().quantity, 10);
    }

    #[test]
    fn test_user_trade_validation() {
        let (service, store) = service();
        for bad in [
            form("", TradeAction::Buy, 1, 10.0),
            form("AAPL", TradeAction::Buy, 0, 10.0),
            form("AAPL", TradeAction::Buy, -5, 10.0),
            form("AAPL", TradeAction::Sell, 1, 0.0),
            form("AAPL", TradeAction::Sell, 1, -5.0),
        ] {
            let err = service.create_user_trade(&user(), bad).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(ref m) if m == MISSING_FIELDS));
        }
        assert_eq!(store.trade_count().unwrap(), 0);
        assert!(store.get_portfolio("user123").unwrap().is_none());
    }

    // =========================================================================
    // Copy trade Tests
    // =========================================================================

    #[test]
    fn test_copy_trade() {
        let (service, _store) = service();
        let bot = TraderIdentity {
            id: "bot-swing-sam".to_string(),
            name: "Swing Sam".to_string(),
            avatar: String::new(),
        };
        let original = service
            .create_user_trade(&bot, form("NVDA", TradeAction::Buy, 3, 875.0))
            .unwrap();

        let copy = service.create_copy_trade(&user(), &original.id).unwrap();
        assert!(copy.is_copy);
        assert_eq!(copy.trader_id, "user123");
        assert_eq!(copy.symbol, "NVDA");
        assert_eq!(copy.quantity, 3);
        assert_eq!(copy.original_trade_id.as_deref(), Some(original.id.as_str()));
        assert_eq!(copy.original_trader_id.as_deref(), Some("bot-swing-sam"));
        assert_eq!(copy.rationale.as_deref(), Some("Copied trade from Swing Sam"));

        let portfolio = service.portfolio("user123").unwrap();
        assert_eq!(portfolio.cash, 100_000.0 - 2_625.0);
    }

    #[test]
    fn test_copy_unknown_trade() {
        let (service, _store) = service();
        let err = service.create_copy_trade(&user(), "missing").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_symbol_trades_limit() {
        let (service, _store) = service();
        for _ in 0..12 {
            service
                .create_user_trade(&user(), form("KO", TradeAction::Buy, 1, 60.0))
                .unwrap();
        }
        service
            .create_user_trade(&user(), form("PEP", TradeAction::Buy, 1, 170.0))
            .unwrap();

        assert_eq!(service.symbol_trades("ko", SYMBOL_TRADES_LIMIT).unwrap().len(), 10);
        assert_eq!(service.user_trades("user123").unwrap().len(), 13);
        assert_eq!(service.recent_trades(5).unwrap().len(), 5);
        assert_eq!(service.recent_trades(50).unwrap()[0].symbol, "PEP");
    }
}
