use std::env;

use crate::types::FeedFrequency;

/// Settings for the continuous bot trade feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Start the feed when the server boots.
    pub enabled: bool,
    /// Minimum delay between batches (ms).
    pub min_interval_ms: u64,
    /// Maximum delay between batches (ms).
    pub max_interval_ms: u64,
    /// How eagerly bots trade.
    pub frequency: FeedFrequency,
    /// Base maximum trades per batch.
    pub max_trades: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_ms: 10_000,
            max_interval_ms: 60_000,
            frequency: FeedFrequency::Normal,
            max_trades: 5,
        }
    }
}

/// The mock "current user" used when a request does not name one.
#[derive(Debug, Clone)]
pub struct DemoUserConfig {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl Default for DemoUserConfig {
    fn default() -> Self {
        Self {
            id: "user123".to_string(),
            name: "Demo User".to_string(),
            avatar: "https://randomuser.me/api/portraits/men/88.jpg".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite document store path.
    pub database_path: String,
    /// Alpha Vantage API key.
    pub alpha_vantage_api_key: String,
    /// Alpha Vantage query endpoint.
    pub alpha_vantage_url: String,
    /// Freshness window for quotes and price history (seconds).
    pub quote_cache_ttl_secs: u64,
    /// Freshness window for company metadata (seconds).
    pub metadata_cache_ttl_secs: u64,
    /// Minimum time between market state refreshes (seconds).
    pub market_state_refresh_secs: u64,
    /// Continuous feed settings.
    pub feed: FeedConfig,
    /// Cash credited to a newly created user portfolio.
    pub default_starting_cash: f64,
    /// Fallback acting user.
    pub demo_user: DemoUserConfig,
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let demo_defaults = DemoUserConfig::default();
        let feed_defaults = FeedConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 3001),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "copyfeed.db".to_string()),
            alpha_vantage_api_key: env::var("ALPHA_VANTAGE_API_KEY")
                .unwrap_or_else(|_| "demo".to_string()),
            alpha_vantage_url: env::var("ALPHA_VANTAGE_URL")
                .unwrap_or_else(|_| "https://www.alphavantage.co/query".to_string()),
            quote_cache_ttl_secs: parse_env("QUOTE_CACHE_TTL_SECS", 15 * 60),
            metadata_cache_ttl_secs: parse_env("METADATA_CACHE_TTL_SECS", 24 * 60 * 60),
            market_state_refresh_secs: parse_env("MARKET_STATE_REFRESH_SECS", 5 * 60),
            feed: FeedConfig {
                enabled: parse_bool("FEED_ENABLED", feed_defaults.enabled),
                min_interval_ms: parse_env("FEED_MIN_INTERVAL_MS", feed_defaults.min_interval_ms),
                max_interval_ms: parse_env("FEED_MAX_INTERVAL_MS", feed_defaults.max_interval_ms),
                frequency: env::var("FEED_FREQUENCY")
                    .ok()
                    .and_then(|v| FeedFrequency::from_str(&v))
                    .unwrap_or(feed_defaults.frequency),
                max_trades: parse_env("FEED_MAX_TRADES", feed_defaults.max_trades),
            },
            default_starting_cash: parse_env("DEFAULT_STARTING_CASH", 100_000.0),
            demo_user: DemoUserConfig {
                id: env::var("DEMO_USER_ID").unwrap_or(demo_defaults.id),
                name: env::var("DEMO_USER_NAME").unwrap_or(demo_defaults.name),
                avatar: env::var("DEMO_USER_AVATAR").unwrap_or(demo_defaults.avatar),
            },
        }
    }

    /// Configuration for tests: in-memory store, feed disabled.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_path: ":memory:".to_string(),
            alpha_vantage_api_key: "test".to_string(),
            alpha_vantage_url: "http://127.0.0.1:9/query".to_string(),
            quote_cache_ttl_secs: 15 * 60,
            metadata_cache_ttl_secs: 24 * 60 * 60,
            market_state_refresh_secs: 5 * 60,
            feed: FeedConfig {
                enabled: false,
                ..FeedConfig::default()
            },
            default_starting_cash: 100_000.0,
            demo_user: DemoUserConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
