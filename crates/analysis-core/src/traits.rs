use async_trait::async_trait;
use crate::{AnalysisError, Bar, MacroSnapshot, RawQuote};

/// Source of per-ticker quote fundamentals and daily price history
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_quote(&self, ticker: &str) -> Result<RawQuote, AnalysisError>;

    /// Daily bars covering roughly the last `lookback_days` calendar days, oldest first.
    async fn fetch_history(&self, ticker: &str, lookback_days: i64) -> Result<Vec<Bar>, AnalysisError>;
}

/// Source of market-wide yields and the volatility index
#[async_trait]
pub trait MacroDataProvider: Send + Sync {
    async fn fetch_macro(&self) -> Result<MacroSnapshot, AnalysisError>;
}
