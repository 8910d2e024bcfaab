use serde::{de, Deserialize, Deserializer, Serialize};

use super::TradingStyle;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    #[default]
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BUY" => Some(TradeAction::Buy),
            "SELL" => Some(TradeAction::Sell),
            _ => None,
        }
    }
}

/// Accepts any casing, so "buy" from a hand-written form still parses.
impl<'de> Deserialize<'de> for TradeAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TradeAction::from_str(&raw).ok_or_else(|| de::Error::unknown_variant(&raw, &["BUY", "SELL"]))
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded trade. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub trader_id: String,
    pub trader_name: String,
    pub trader_avatar: String,
    pub symbol: String,
    pub action: TradeAction,
    pub price: f64,
    pub quantity: u64,
    pub value: f64,
    /// Creation time (ms since epoch).
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_style: Option<TradingStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Simulated percent gain shown next to bot trades.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_copy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_trade_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_trader_id: Option<String>,
}

/// Who is placing a trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TraderIdentity {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl Trade {
    /// Build a trade stamped with a fresh id and the current time.
    pub fn new(
        trader: &TraderIdentity,
        symbol: impl Into<String>,
        action: TradeAction,
        price: f64,
        quantity: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trader_id: trader.id.clone(),
            trader_name: trader.name.clone(),
            trader_avatar: trader.avatar.clone(),
            symbol: symbol.into(),
            action,
            price,
            quantity,
            value: price * quantity as f64,
            timestamp: chrono::Utc::now().timestamp_millis(),
            rationale: None,
            trading_style: None,
            sector: None,
            gain: None,
            is_bot: false,
            is_copy: false,
            original_trade_id: None,
            original_trader_id: None,
        }
    }
}

/// Trade form submitted by a user.
///
/// Missing or out of range values still deserialize; the trade service
/// rejects them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTradeRequest {
    #[serde(default)]
    pub symbol: String,
    /// The form starts on BUY.
    #[serde(default)]
    pub action: TradeAction,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rationale: Option<String>,
}
