//! Cash and holdings arithmetic for a single trade.

use crate::types::{BotTrader, Holding, Portfolio, PortfolioPerformance, Trade, TradeAction};

/// Apply `trade` to `portfolio` and recompute its total value.
///
/// Cash may go negative; nothing here checks buying power.
pub fn apply_trade(portfolio: &mut Portfolio, trade: &Trade) {
    let value = trade.price * trade.quantity as f64;
    let existing = portfolio
        .holdings
        .iter()
        .position(|h| h.symbol == trade.symbol);

    match trade.action {
        TradeAction::Buy => {
            portfolio.cash -= value;
            match existing {
                Some(idx) => {
                    let holding = &mut portfolio.holdings[idx];
                    holding.quantity += trade.quantity;
                    holding.total_cost += value;
                    holding.average_price = holding.total_cost / holding.quantity as f64;
                    holding.last_price = trade.price;
                    holding.last_updated = trade.timestamp;
                }
                None => portfolio.holdings.push(Holding {
                    symbol: trade.symbol.clone(),
                    quantity: trade.quantity,
                    total_cost: value,
                    average_price: trade.price,
                    last_price: trade.price,
                    last_updated: trade.timestamp,
                }),
            }
        }
        TradeAction::Sell => {
            portfolio.cash += value;
            if let Some(idx) = existing {
                let holding = &mut portfolio.holdings[idx];
                if holding.quantity <= trade.quantity {
                    portfolio.holdings.remove(idx);
                } else {
                    holding.quantity -= trade.quantity;
                    holding.last_price = trade.price;
                    holding.last_updated = trade.timestamp;
                }
            }
        }
    }

    portfolio.total_value = portfolio.cash + portfolio.holdings_value();
    portfolio.last_updated = trade.timestamp;
}

/// Headline numbers for a bot after a trade.
pub fn bot_performance(portfolio: &Portfolio, bot: &BotTrader) -> PortfolioPerformance {
    let overall = if bot.initial_capital > 0.0 {
        (portfolio.total_value / bot.initial_capital - 1.0) * 100.0
    } else {
        0.0
    };

    PortfolioPerformance {
        overall,
        monthly: overall / 12.0,
        win_rate: bot.performance.win_rate,
    }
}

/// Apply a bot's trade and refresh its performance block.
pub fn apply_bot_trade(portfolio: &mut Portfolio, trade: &Trade, bot: &BotTrader) {
    apply_trade(portfolio, trade);
    portfolio.performance = Some(bot_performance(portfolio, bot));
}
