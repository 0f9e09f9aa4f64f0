use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Market data
    pub market_data_base_url: String,
    pub ticker_suffix: String,            // ".T" for Tokyo
    pub fetch_timeout_secs: u64,
    pub cache_ttl_secs: i64,
    pub history_lookback_days: i64,
    pub rate_limit_per_min: usize,

    // Ledgers
    pub ledger_path: PathBuf,
    pub fund_ledger_path: PathBuf,

    // Manual macro inputs
    pub buffett_indicator: Option<f64>,   // market cap / GDP, percent
    pub shiller_pe: Option<f64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| -> Result<Option<f64>> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(v) => Ok(Some(v.trim().parse().with_context(|| format!("{} must be a number", key))?)),
                None => Ok(None),
            }
        };

        let config = Self {
            market_data_base_url: get("MARKET_DATA_BASE_URL", market_data_client::DEFAULT_BASE_URL),
            ticker_suffix: get("TICKER_SUFFIX", market_data_client::DEFAULT_TICKER_SUFFIX),
            fetch_timeout_secs: get("FETCH_TIMEOUT_SECS", "30")
                .parse()
                .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            cache_ttl_secs: get("CACHE_TTL_SECS", "3600")
                .parse()
                .context("CACHE_TTL_SECS must be a whole number of seconds")?,
            history_lookback_days: get("HISTORY_LOOKBACK_DAYS", "180")
                .parse()
                .context("HISTORY_LOOKBACK_DAYS must be a whole number of days")?,
            rate_limit_per_min: get("RATE_LIMIT_PER_MIN", "60")
                .parse()
                .context("RATE_LIMIT_PER_MIN must be a positive integer")?,
            ledger_path: PathBuf::from(get("LEDGER_PATH", "data/purchases.csv")),
            fund_ledger_path: PathBuf::from(get("FUND_LEDGER_PATH", "data/fund_purchases.csv")),
            buffett_indicator: optional("BUFFETT_INDICATOR")?,
            shiller_pe: optional("SHILLER_PE")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("FETCH_TIMEOUT_SECS must be greater than zero");
        }
        if self.history_lookback_days < 1 {
            anyhow::bail!("HISTORY_LOOKBACK_DAYS must be at least 1");
        }
        if self.rate_limit_per_min == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MIN must be greater than zero");
        }
        if self.cache_ttl_secs < 0 {
            anyhow::bail!("CACHE_TTL_SECS cannot be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config.ticker_suffix, ".T");
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.history_lookback_days, 180);
        assert_eq!(config.buffett_indicator, None);
        assert_eq!(config.ledger_path, PathBuf::from("data/purchases.csv"));
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("TICKER_SUFFIX", ""),
            ("CACHE_TTL_SECS", "60"),
            ("BUFFETT_INDICATOR", "195.5"),
            ("SHILLER_PE", " "),
        ])
        .unwrap();
        assert_eq!(config.ticker_suffix, "");
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.buffett_indicator, Some(195.5));
        assert_eq!(config.shiller_pe, None);
    }

    #[test]
    fn test_parse_failures_name_the_key() {
        let err = from_map(&[("FETCH_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("FETCH_TIMEOUT_SECS"));

        let err = from_map(&[("SHILLER_PE", "high")]).unwrap_err();
        assert!(err.to_string().contains("SHILLER_PE"));

        assert!(from_map(&[("RATE_LIMIT_PER_MIN", "0")]).is_err());
    }
}
