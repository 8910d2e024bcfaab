//! The scripted bot personas and the stocks they trade.

use crate::types::{BotTrader, PortfolioPerformance, RiskTolerance, StockInfo, TradingStyle};

/// Stocks the bots pick from.
pub const POPULAR_STOCKS: [StockInfo; 15] = [
    StockInfo { symbol: "AAPL", name: "Apple Inc.", sector: "Technology" },
    StockInfo { symbol: "MSFT", name: "Microsoft Corporation", sector: "Technology" },
    StockInfo { symbol: "GOOGL", name: "Alphabet Inc.", sector: "Communication Services" },
    StockInfo { symbol: "AMZN", name: "Amazon.com Inc.", sector: "Consumer Cyclical" },
    StockInfo { symbol: "META", name: "Meta Platforms Inc.", sector: "Communication Services" },
    StockInfo { symbol: "TSLA", name: "Tesla, Inc.", sector: "Consumer Cyclical" },
    StockInfo { symbol: "JPM", name: "JPMorgan Chase & Co.", sector: "Financial Services" },
    StockInfo { symbol: "V", name: "Visa Inc.", sector: "Financial Services" },
    StockInfo { symbol: "JNJ", name: "Johnson & Johnson", sector: "Healthcare" },
    StockInfo { symbol: "PG", name: "Procter & Gamble Co.", sector: "Consumer Defensive" },
    StockInfo { symbol: "NVDA", name: "NVIDIA Corporation", sector: "Technology" },
    StockInfo { symbol: "DIS", name: "Walt Disney Co.", sector: "Communication Services" },
    StockInfo { symbol: "NFLX", name: "Netflix, Inc.", sector: "Communication Services" },
    StockInfo { symbol: "KO", name: "Coca-Cola Co.", sector: "Consumer Defensive" },
    StockInfo { symbol: "PEP", name: "PepsiCo, Inc.", sector: "Consumer Defensive" },
];

/// Reference stocks used to gauge each sector's daily move.
pub const SECTOR_STOCKS: [(&str, &[&str]); 5] = [
    ("Technology", &["AAPL", "MSFT", "NVDA"]),
    ("Consumer Cyclical", &["AMZN", "TSLA"]),
    ("Financial Services", &["JPM", "V"]),
    ("Healthcare", &["JNJ"]),
    ("Communication Services", &["GOOGL", "META"]),
];

struct Persona {
    id: &'static str,
    name: &'static str,
    avatar: &'static str,
    bio: &'static str,
    style: TradingStyle,
    strategy: &'static str,
    risk: RiskTolerance,
    frequency: f64,
    sectors: &'static [&'static str],
    capital: f64,
    performance: (f64, f64, f64),
    followers: u64,
    following: u64,
}

const PERSONAS: [Persona; 5] = [
    Persona {
        id: "bot-momentum-mike",
        name: "Momentum Mike",
        avatar: "https://randomuser.me/api/portraits/men/32.jpg",
        bio: "I ride the wave of market momentum. When stocks are going up, I buy more. Simple as that!",
        style: TradingStyle::Momentum,
        strategy: "Buys stocks showing upward price momentum and strong volume",
        risk: RiskTolerance::High,
        frequency: 0.4,
        sectors: &["Technology", "Consumer Cyclical", "Communication Services"],
        capital: 100_000.0,
        performance: (27.5, 3.2, 62.0),
        followers: 485,
        following: 20,
    },
    Persona {
        id: "bot-value-victoria",
        name: "Value Victoria",
        avatar: "https://randomuser.me/api/portraits/women/45.jpg",
        bio: "Fundamentals matter. I look for undervalued companies with strong balance sheets and consistent cash flow.",
        style: TradingStyle::Value,
        strategy: "Buys undervalued stocks based on P/E ratio and other fundamentals",
        risk: RiskTolerance::Low,
        frequency: 0.15,
        sectors: &["Financial Services", "Healthcare", "Utilities", "Consumer Defensive"],
        capital: 250_000.0,
        performance: (18.3, 1.5, 74.0),
        followers: 612,
        following: 8,
    },
    Persona {
        id: "bot-swing-sam",
        name: "Swing Sam",
        avatar: "https://randomuser.me/api/portraits/men/62.jpg",
        bio: "Catching the swings is my game. I look for short-term price movements and capitalize on market volatility.",
        style: TradingStyle::Swing,
        strategy: "Makes short-term trades based on technical indicators and market sentiment",
        risk: RiskTolerance::Medium,
        frequency: 0.5,
        sectors: &["Technology", "Energy", "Basic Materials", "Industrial"],
        capital: 75_000.0,
        performance: (22.8, 2.7, 58.0),
        followers: 327,
        following: 15,
    },
    Persona {
        id: "bot-dca-deb",
        name: "DCA Deb",
        avatar: "https://randomuser.me/api/portraits/women/28.jpg",
        bio: "Slow and steady wins the race. I dollar-cost average into quality companies for the long term.",
        style: TradingStyle::Value,
        strategy: "Regularly invests in blue-chip stocks regardless of market conditions",
        risk: RiskTolerance::Low,
        frequency: 0.25,
        sectors: &["Financial Services", "Consumer Defensive", "Healthcare", "Utilities"],
        capital: 150_000.0,
        performance: (15.2, 1.3, 70.0),
        followers: 578,
        following: 5,
    },
    Persona {
        id: "bot-tech-tyler",
        name: "Tech Tyler",
        avatar: "https://randomuser.me/api/portraits/men/8.jpg",
        bio: "Technology is the future. I focus exclusively on cutting-edge tech companies with disruptive potential.",
        style: TradingStyle::Growth,
        strategy: "Invests in technology companies with high growth potential",
        risk: RiskTolerance::High,
        frequency: 0.3,
        sectors: &["Technology", "Communication Services"],
        capital: 120_000.0,
        performance: (31.5, 3.8, 60.0),
        followers: 842,
        following: 12,
    },
];

impl Persona {
    fn to_trader(&self, created_at: i64) -> BotTrader {
        let (overall, monthly, win_rate) = self.performance;
        BotTrader {
            id: self.id.to_string(),
            name: self.name.to_string(),
            avatar: self.avatar.to_string(),
            bio: self.bio.to_string(),
            trading_style: self.style,
            strategy: self.strategy.to_string(),
            risk_tolerance: self.risk,
            trading_frequency: self.frequency,
            sector_preferences: self.sectors.iter().map(|s| s.to_string()).collect(),
            initial_capital: self.capital,
            performance: PortfolioPerformance {
                overall,
                monthly,
                win_rate,
            },
            is_bot: true,
            followers: self.followers,
            following: self.following,
            created_at,
        }
    }
}

/// All bot personas, stamped with the current time.
pub fn bot_traders() -> Vec<BotTrader> {
    let now = chrono::Utc::now().timestamp_millis();
    PERSONAS.iter().map(|p| p.to_trader(now)).collect()
}

/// Ids of every bot persona, in roster order.
pub fn bot_ids() -> Vec<String> {
    PERSONAS.iter().map(|p| p.id.to_string()).collect()
}

pub fn find_bot(id: &str) -> Option<BotTrader> {
    PERSONAS
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.to_trader(chrono::Utc::now().timestamp_millis()))
}

pub fn stock_info(symbol: &str) -> Option<&'static StockInfo> {
    POPULAR_STOCKS.iter().find(|s| s.symbol == symbol)
}

/// Popular stocks in any of `sectors`, in table order.
pub fn stocks_in_sectors(sectors: &[String]) -> Vec<StockInfo> {
    POPULAR_STOCKS
        .iter()
        .filter(|s| sectors.iter().any(|sector| sector == s.sector))
        .copied()
        .collect()
}
