pub mod cache;
pub mod rate_limit;
pub mod ticker;
pub mod yahoo;

pub use cache::{CachedProvider, DEFAULT_CACHE_TTL_SECS};
pub use rate_limit::RateLimiter;
pub use ticker::{normalize_ticker, DEFAULT_TICKER_SUFFIX};
pub use yahoo::{YahooFinanceClient, DEFAULT_BASE_URL};
