use analysis_core::{AnalysisError, Bar, MacroDataProvider, MacroSnapshot, MarketDataProvider, RawQuote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

const MACRO_KEY: &str = "macro";

/// Internal cache entry with timestamp
#[derive(Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

impl<T: Clone> CacheEntry<T> {
    fn fresh(&self, ttl_secs: i64) -> Option<T> {
        let age = (Utc::now() - self.cached_at).num_seconds();
        (age < ttl_secs).then(|| self.data.clone())
    }
}

/// Wraps a provider with per-key TTL caching. Errors are never cached.
pub struct CachedProvider<P> {
    inner: P,
    ttl_secs: i64,
    quote_cache: DashMap<String, CacheEntry<RawQuote>>,
    /// Keyed by (ticker, lookback days)
    history_cache: DashMap<(String, i64), CacheEntry<Vec<Bar>>>,
    macro_cache: DashMap<&'static str, CacheEntry<MacroSnapshot>>,
}

impl<P> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL_SECS)
    }

    pub fn with_ttl(inner: P, ttl_secs: i64) -> Self {
        Self {
            inner,
            ttl_secs,
            quote_cache: DashMap::new(),
            history_cache: DashMap::new(),
            macro_cache: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn clear(&self) {
        self.quote_cache.clear();
        self.history_cache.clear();
        self.macro_cache.clear();
    }

    /// Number of cached entries across all kinds.
    pub fn len(&self) -> usize {
        self.quote_cache.len() + self.history_cache.len() + self.macro_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn fetch_quote(&self, ticker: &str) -> Result<RawQuote, AnalysisError> {
        let key = cache_key(ticker);
        if let Some(data) = self.quote_cache.get(&key).and_then(|e| e.fresh(self.ttl_secs)) {
            tracing::debug!("Quote cache hit for {}", key);
            return Ok(data);
        }

        let quote = self.inner.fetch_quote(ticker).await?;
        self.quote_cache.insert(key, CacheEntry {
            data: quote.clone(),
            cached_at: Utc::now(),
        });
        Ok(quote)
    }

    async fn fetch_history(&self, ticker: &str, lookback_days: i64) -> Result<Vec<Bar>, AnalysisError> {
        let key = (cache_key(ticker), lookback_days);
        if let Some(data) = self.history_cache.get(&key).and_then(|e| e.fresh(self.ttl_secs)) {
            tracing::debug!("History cache hit for {} ({}d)", key.0, lookback_days);
            return Ok(data);
        }

        let bars = self.inner.fetch_history(ticker, lookback_days).await?;
        self.history_cache.insert(key, CacheEntry {
            data: bars.clone(),
            cached_at: Utc::now(),
        });
        Ok(bars)
    }
}

#[async_trait]
impl<P: MacroDataProvider> MacroDataProvider for CachedProvider<P> {
    async fn fetch_macro(&self) -> Result<MacroSnapshot, AnalysisError> {
        if let Some(data) = self.macro_cache.get(MACRO_KEY).and_then(|e| e.fresh(self.ttl_secs)) {
            return Ok(data);
        }

        let snapshot = self.inner.fetch_macro().await?;
        self.macro_cache.insert(MACRO_KEY, CacheEntry {
            data: snapshot,
            cached_at: Utc::now(),
        });
        Ok(snapshot)
    }
}
