use serde::{Deserialize, Serialize};

use super::PortfolioPerformance;

/// Trading style of a bot persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingStyle {
    Momentum,
    Value,
    Swing,
    Growth,
}

impl TradingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingStyle::Momentum => "momentum",
            TradingStyle::Value => "value",
            TradingStyle::Swing => "swing",
            TradingStyle::Growth => "growth",
        }
    }
}

/// Position sizing bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    /// Fraction of available cash committed to a BUY.
    pub fn buy_fraction(&self) -> f64 {
        match self {
            RiskTolerance::Low => 0.01,
            RiskTolerance::Medium => 0.03,
            RiskTolerance::High => 0.07,
        }
    }

    /// Inclusive share range for a SELL.
    pub fn sell_range(&self) -> (u64, u64) {
        match self {
            RiskTolerance::Low => (1, 5),
            RiskTolerance::Medium => (2, 11),
            RiskTolerance::High => (5, 24),
        }
    }
}

/// How eagerly bots trade relative to their base frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFrequency {
    Low,
    #[default]
    Normal,
    High,
}

impl FeedFrequency {
    pub fn multiplier(&self) -> f64 {
        match self {
            FeedFrequency::Low => 0.5,
            FeedFrequency::Normal => 1.0,
            FeedFrequency::High => 2.0,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(FeedFrequency::Low),
            "normal" => Some(FeedFrequency::Normal),
            "high" => Some(FeedFrequency::High),
            _ => None,
        }
    }
}

/// A scripted bot persona. Static demo data, not user data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTrader {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub trading_style: TradingStyle,
    pub strategy: String,
    pub risk_tolerance: RiskTolerance,
    /// Probability of trading on each check (0.0 - 1.0).
    pub trading_frequency: f64,
    pub sector_preferences: Vec<String>,
    pub initial_capital: f64,
    pub performance: PortfolioPerformance,
    pub is_bot: bool,
    pub followers: u64,
    pub following: u64,
    pub created_at: i64,
}

/// A tradable stock and its sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trading_style_serialization() {
        assert_eq!(serde_json::to_string(&TradingStyle::Momentum).unwrap(), "\"momentum\"");
        let style: TradingStyle = serde_json::from_str("\"growth\"").unwrap();
        assert_eq!(style, TradingStyle::Growth);
        assert_eq!(TradingStyle::Swing.as_str(), "swing");
    }

    #[test]
    fn test_risk_tolerance_sizing() {
        assert_eq!(RiskTolerance::Low.buy_fraction(), 0.01);
        assert_eq!(RiskTolerance::Medium.buy_fraction(), 0.03);
        assert_eq!(RiskTolerance::High.buy_fraction(), 0.07);
        assert_eq!(RiskTolerance::Low.sell_range(), (1, 5));
        assert_eq!(RiskTolerance::Medium.sell_range(), (2, 11));
        assert_eq!(RiskTolerance::High.sell_range(), (5, 24));
    }

    #[test]
    fn test_feed_frequency() {
        assert_eq!(FeedFrequency::from_str("HIGH"), Some(FeedFrequency::High));
        assert_eq!(FeedFrequency::from_str("sometimes"), None);
        assert_eq!(FeedFrequency::Low.multiplier(), 0.5);
        assert_eq!(FeedFrequency::default(), FeedFrequency::Normal);
    }
}
