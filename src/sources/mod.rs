pub mod alphavantage;

pub use alphavantage::{
    AlphaVantageClient, CompanyOverview, GlobalQuote, QuoteError, QuoteFuture, QuoteSource,
    SeriesKind,
};
