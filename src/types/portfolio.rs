use serde::{Deserialize, Serialize};

/// A position in one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub quantity: u64,
    pub total_cost: f64,
    pub average_price: f64,
    pub last_price: f64,
    pub last_updated: i64,
}

impl Holding {
    /// Market value at the last traded price.
    pub fn market_value(&self) -> f64 {
        self.last_price * self.quantity as f64
    }
}

/// Headline performance numbers shown on trader cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPerformance {
    /// Overall return (%).
    pub overall: f64,
    /// Simplified monthly return (%).
    pub monthly: f64,
    /// Win rate (%).
    pub win_rate: f64,
}

/// Cash and holdings ledger for one user or bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub trader_id: String,
    pub cash: f64,
    pub total_value: f64,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PortfolioPerformance>,
    pub last_updated: i64,
}

impl Portfolio {
    /// Empty portfolio holding only cash.
    pub fn with_cash(trader_id: impl Into<String>, cash: f64) -> Self {
        Self {
            trader_id: trader_id.into(),
            cash,
            total_value: cash,
            holdings: Vec::new(),
            performance: None,
            last_updated: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    /// Sum of holding market values.
    pub fn holdings_value(&self) -> f64 {
        self.holdings.iter().map(Holding::market_value).sum()
    }
}
