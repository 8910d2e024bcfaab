use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current quote for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    /// When the quote was fetched (ms since epoch).
    pub timestamp: i64,
    /// RFC 3339 time the quote was last handed out.
    pub last_updated: String,
    /// True when the price was generated locally instead of fetched.
    #[serde(default)]
    pub simulated: bool,
}

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` for intraday bars.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Close-only point used for index charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHistoryPoint {
    pub date: String,
    pub value: f64,
}

/// Chart range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "1week")]
    OneWeek,
    #[default]
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "all")]
    All,
}

impl Timeframe {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1day" => Some(Timeframe::OneDay),
            "1week" => Some(Timeframe::OneWeek),
            "1month" => Some(Timeframe::OneMonth),
            "3months" => Some(Timeframe::ThreeMonths),
            "all" => Some(Timeframe::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1day",
            Timeframe::OneWeek => "1week",
            Timeframe::OneMonth => "1month",
            Timeframe::ThreeMonths => "3months",
            Timeframe::All => "all",
        }
    }

    /// Days of daily bars kept for this range, when it filters by date.
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            Timeframe::OneWeek => Some(7),
            Timeframe::OneMonth => Some(30),
            Timeframe::ThreeMonths => Some(90),
            Timeframe::OneDay | Timeframe::All => None,
        }
    }

    /// Days generated when this range has to be simulated.
    pub fn simulated_days(&self) -> i64 {
        self.lookback_days().unwrap_or(30)
    }
}

/// Company overview data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub sector: String,
    pub industry: String,
    pub instrument_type: String,
    pub exchange: String,
    pub market_cap: Option<u64>,
    pub pe_ratio: Option<f64>,
    pub timestamp: i64,
    pub last_updated: String,
}

impl AssetMetadata {
    /// Record returned when the overview cannot be fetched.
    pub fn fallback(symbol: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            description: String::new(),
            sector: "Technology".to_string(),
            industry: "Unknown".to_string(),
            instrument_type: "Stock".to_string(),
            exchange: "NASDAQ".to_string(),
            market_cap: None,
            pe_ratio: None,
            timestamp: now.timestamp_millis(),
            last_updated: now.to_rfc3339(),
        }
    }
}

/// Quote for one of the tracked market indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    #[serde(default)]
    pub error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTrend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    #[default]
    Medium,
    High,
}

/// Average move of a sector's reference stocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorPerformance {
    pub change: f64,
    pub trend: MarketTrend,
}

impl SectorPerformance {
    pub fn from_change(change: f64) -> Self {
        let trend = if change > 0.5 {
            MarketTrend::Bullish
        } else if change < -0.5 {
            MarketTrend::Bearish
        } else {
            MarketTrend::Neutral
        };
        Self { change, trend }
    }
}

/// Snapshot of overall market conditions used to bias bot behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketState {
    pub market_trend: MarketTrend,
    pub volatility: Volatility,
    pub sector_performance: HashMap<String, SectorPerformance>,
    /// Last successful refresh (ms since epoch).
    pub last_check: Option<i64>,
}
