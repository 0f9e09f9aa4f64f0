use analysis_core::{
    sanitize, AnalysisError, Bar, MacroDataProvider, MacroSnapshot, MarketDataProvider,
    RawBalanceSheet, RawIncomeStatement, RawQuote, RawValue,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::ticker::{normalize_ticker, DEFAULT_TICKER_SUFFIX};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const QUOTE_MODULES: &str =
    "price,summaryDetail,financialData,defaultKeyStatistics,balanceSheetHistory,incomeStatementHistory";

pub const TEN_YEAR_SYMBOL: &str = "^TNX";
pub const SHORT_YIELD_SYMBOL: &str = "^FVX";
pub const VOLATILITY_SYMBOL: &str = "^VIX";

const MAX_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct YahooFinanceClient {
    base_url: String,
    ticker_suffix: String,
    client: Client,
    rate_limiter: RateLimiter,
    retry_wait: Duration,
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (position-signals)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ticker_suffix: DEFAULT_TICKER_SUFFIX.to_string(),
            client,
            rate_limiter: RateLimiter::per_minute(60),
            retry_wait: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_ticker_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.ticker_suffix = suffix.into();
        self
    }

    pub fn with_rate_limit(mut self, per_minute: usize) -> Self {
        self.rate_limiter = RateLimiter::per_minute(per_minute);
        self
    }

    /// Pause between attempts after a 429.
    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    pub fn symbol_for(&self, ticker: &str) -> Result<String, AnalysisError> {
        let symbol = normalize_ticker(ticker, &self.ticker_suffix);
        if symbol.is_empty() {
            return Err(AnalysisError::InvalidData("Empty ticker".to_string()));
        }
        Ok(symbol)
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::Provider(e.to_string()))?;

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::Provider("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::Provider(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            tracing::warn!(
                "Market data 429 rate limited, waiting {}ms before retry {}/{}",
                self.retry_wait.as_millis(),
                attempt + 1,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(self.retry_wait).await;
        }

        Err(AnalysisError::Provider(format!(
            "Rate limited by market data provider after {} retries",
            MAX_ATTEMPTS
        )))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, AnalysisError> {
        let response = self.send_request(self.client.get(url).query(query)).await?;

        if !response.status().is_success() {
            return Err(AnalysisError::Provider(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(e.to_string()))
    }

    async fn get_chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<ChartResult, AnalysisError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response: ChartResponse = self.get_json(&url, query).await?;
        response.chart.into_result(symbol)
    }

    /// Daily bars between now and `lookback_days` ago.
    pub async fn get_daily_bars(&self, ticker: &str, lookback_days: i64) -> Result<Vec<Bar>, AnalysisError> {
        let symbol = self.symbol_for(ticker)?;
        let to = Utc::now();
        let from = to - ChronoDuration::days(lookback_days.max(1));
        let query = [
            ("period1", from.timestamp().to_string()),
            ("period2", to.timestamp().to_string()),
            ("interval", "1d".to_string()),
        ];
        let chart = self.get_chart(&symbol, &query).await?;
        let bars = chart.bars();
        tracing::debug!("Fetched {} daily bars for {}", bars.len(), symbol);
        Ok(bars)
    }

    /// Latest value of an index symbol such as `^TNX`.
    pub async fn get_latest_value(&self, symbol: &str) -> Result<Option<f64>, AnalysisError> {
        let query = [("range", "5d".to_string()), ("interval", "1d".to_string())];
        let chart = self.get_chart(symbol, &query).await?;
        Ok(chart.latest_value())
    }

    pub async fn get_quote_summary(&self, ticker: &str) -> Result<RawQuote, AnalysisError> {
        let symbol = self.symbol_for(ticker)?;
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let query = [("modules", QUOTE_MODULES.to_string())];
        let response: QuoteSummaryResponse = self.get_json(&url, &query).await?;

        if let Some(err) = response.quote_summary.error.filter(|e| !e.is_null()) {
            return Err(AnalysisError::Provider(format!("{}: {}", symbol, describe_error(&err))));
        }
        let result = response
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| AnalysisError::Provider(format!("No quote data for {}", symbol)))?;

        Ok(parse_quote_summary(&symbol, &result))
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn fetch_quote(&self, ticker: &str) -> Result<RawQuote, AnalysisError> {
        self.get_quote_summary(ticker).await
    }

    async fn fetch_history(&self, ticker: &str, lookback_days: i64) -> Result<Vec<Bar>, AnalysisError> {
        self.get_daily_bars(ticker, lookback_days).await
    }
}

#[async_trait]
impl MacroDataProvider for YahooFinanceClient {
    /// A failed leg becomes `None`; only a total failure is an error.
    async fn fetch_macro(&self) -> Result<MacroSnapshot, AnalysisError> {
        let (ten, short, vix) = tokio::join!(
            self.get_latest_value(TEN_YEAR_SYMBOL),
            self.get_latest_value(SHORT_YIELD_SYMBOL),
            self.get_latest_value(VOLATILITY_SYMBOL),
        );

        if let (Err(e), Err(_), Err(_)) = (&ten, &short, &vix) {
            return Err(e.clone());
        }

        let leg = |name: &str, result: Result<Option<f64>, AnalysisError>| match result {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Macro reading {} unavailable: {}", name, e);
                None
            }
        };

        Ok(MacroSnapshot {
            ten_year_yield: leg(TEN_YEAR_SYMBOL, ten),
            short_yield: leg(SHORT_YIELD_SYMBOL, short),
            volatility_index: leg(VOLATILITY_SYMBOL, vix),
            buffett_indicator: None,
            shiller_pe: None,
        })
    }
}

// Chart endpoint

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<Value>,
}

impl ChartEnvelope {
    fn into_result(self, symbol: &str) -> Result<ChartResult, AnalysisError> {
        if let Some(err) = self.error.filter(|e| !e.is_null()) {
            return Err(AnalysisError::Provider(format!("{}: {}", symbol, describe_error(&err))));
        }
        self.result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| AnalysisError::Provider(format!("No chart data for {}", symbol)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// Bars with a null or non-finite close are dropped (market holidays).
    fn bars(&self) -> Vec<Bar> {
        let Some(quote) = self.indicators.as_ref().and_then(|i| i.quote.first()) else {
            return Vec::new();
        };
        let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let close = at(&quote.close, i).filter(|c| c.is_finite())?;
                let timestamp = DateTime::from_timestamp(ts, 0)?;
                Some(Bar {
                    timestamp,
                    open: at(&quote.open, i).unwrap_or(close),
                    high: at(&quote.high, i).unwrap_or(close),
                    low: at(&quote.low, i).unwrap_or(close),
                    close,
                    volume: at(&quote.volume, i).unwrap_or(0.0),
                })
            })
            .collect()
    }

    fn latest_value(&self) -> Option<f64> {
        self.meta
            .as_ref()
            .and_then(|m| m.regular_market_price)
            .filter(|v| v.is_finite())
            .or_else(|| self.bars().last().map(|b| b.close))
    }
}

// quoteSummary endpoint

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    result: Option<Vec<Value>>,
    error: Option<Value>,
}

fn describe_error(err: &Value) -> String {
    err.get("description")
        .and_then(Value::as_str)
        .or_else(|| err.get("code").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

fn field(result: &Value, pointer: &str) -> RawValue {
    RawValue::from(result.pointer(pointer))
}

/// First pointer that sanitizes to a number wins.
fn first_present(result: &Value, pointers: &[&str]) -> RawValue {
    pointers
        .iter()
        .map(|p| field(result, p))
        .find(|raw| sanitize(raw).is_some())
        .unwrap_or_default()
}

fn parse_quote_summary(symbol: &str, result: &Value) -> RawQuote {
    let balance_sheets = result
        .pointer("/balanceSheetHistory/balanceSheetStatements")
        .and_then(Value::as_array)
        .map(|statements| {
            statements
                .iter()
                .map(|s| RawBalanceSheet {
                    total_assets: RawValue::from(s.get("totalAssets")),
                    stockholders_equity: RawValue::from(s.get("totalStockholderEquity")),
                })
                .collect()
        })
        .unwrap_or_default();

    let income_statements = result
        .pointer("/incomeStatementHistory/incomeStatementHistory")
        .and_then(Value::as_array)
        .map(|statements| {
            statements
                .iter()
                .map(|s| RawIncomeStatement {
                    total_revenue: RawValue::from(s.get("totalRevenue")),
                    operating_income: RawValue::from(s.get("operatingIncome")),
                })
                .collect()
        })
        .unwrap_or_default();

    let name = ["/price/longName", "/price/shortName"]
        .iter()
        .filter_map(|p| result.pointer(p).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string);

    RawQuote {
        symbol: symbol.to_string(),
        name,
        current_price: first_present(result, &["/financialData/currentPrice", "/price/regularMarketPrice"]),
        fifty_two_week_high: field(result, "/summaryDetail/fiftyTwoWeekHigh"),
        fifty_two_week_low: field(result, "/summaryDetail/fiftyTwoWeekLow"),
        trailing_pe: field(result, "/summaryDetail/trailingPE"),
        price_to_book: field(result, "/defaultKeyStatistics/priceToBook"),
        return_on_equity: field(result, "/financialData/returnOnEquity"),
        dividend_yield: field(result, "/summaryDetail/dividendYield"),
        market_cap: first_present(result, &["/summaryDetail/marketCap", "/price/marketCap"]),
        balance_sheets,
        income_statements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quote_summary() {
        let result = json!({
            "price": {
                "regularMarketPrice": {"raw": 2010.0, "fmt": "2,010.00"},
                "longName": "Toyota Motor Corporation"
            },
            "summaryDetail": {
                "fiftyTwoWeekHigh": {"raw": 3891.0},
                "fiftyTwoWeekLow": {"raw": 1800.5},
                "trailingPE": {"raw": 9.2},
                "dividendYield": {},
                "marketCap": {"raw": 3.2e13}
            },
            "financialData": {
                "currentPrice": {"raw": 2000.0},
                "returnOnEquity": {"raw": 0.135}
            },
            "defaultKeyStatistics": {"priceToBook": "N/A"},
            "balanceSheetHistory": {"balanceSheetStatements": [
                {"totalAssets": {"raw": 100.0}, "totalStockholderEquity": {"raw": 38.0}}
            ]},
            "incomeStatementHistory": {"incomeStatementHistory": [
                {"totalRevenue": {"raw": 45.0}, "operatingIncome": {"raw": 5.3}},
                {"totalRevenue": {"raw": 37.1}, "operatingIncome": {"raw": 2.7}}
            ]}
        });

        let quote = parse_quote_summary("7203.T", &result);
        assert_eq!(quote.name.as_deref(), Some("Toyota Motor Corporation"));
        assert_eq!(sanitize(&quote.current_price), Some(2000.0));
        assert_eq!(sanitize(&quote.trailing_pe), Some(9.2));
        assert_eq!(sanitize(&quote.dividend_yield), None);
        assert_eq!(sanitize(&quote.price_to_book), None);
        assert_eq!(quote.balance_sheets.len(), 1);
        assert_eq!(quote.income_statements.len(), 2);
        assert_eq!(sanitize(&quote.income_statements[1].operating_income), Some(2.7));
    }

    #[test]
    fn test_current_price_falls_back_to_market_price() {
        let result = json!({
            "price": {"regularMarketPrice": {"raw": 1500.0}},
            "financialData": {"currentPrice": {}}
        });
        let quote = parse_quote_summary("9101.T", &result);
        assert_eq!(sanitize(&quote.current_price), Some(1500.0));
        assert!(quote.balance_sheets.is_empty());
        assert!(quote.name.is_none());
    }

    #[test]
    fn test_chart_bars_skip_null_closes() {
        let chart: ChartResult = serde_json::from_value(json!({
            "meta": {"regularMarketPrice": 102.0},
            "timestamp": [1700000000, 1700086400, 1700172800],
            "indicators": {"quote": [{
                "open": [100.0, null, 101.0],
                "high": [101.0, null, 103.0],
                "low": [99.0, null, 100.0],
                "close": [100.5, null, 102.0],
                "volume": [1000, null, 1200]
            }]}
        }))
        .unwrap();

        let bars = chart.bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 102.0);
        assert_eq!(bars[1].volume, 1200.0);
        assert_eq!(chart.latest_value(), Some(102.0));
    }

    #[test]
    fn test_chart_latest_value_without_meta_price() {
        let chart: ChartResult = serde_json::from_value(json!({
            "timestamp": [1700000000, 1700086400],
            "indicators": {"quote": [{"close": [14.2, 15.1]}]}
        }))
        .unwrap();
        assert_eq!(chart.latest_value(), Some(15.1));
    }

    #[test]
    fn test_chart_error_envelope() {
        let envelope: ChartEnvelope = serde_json::from_value(json!({
            "result": null,
            "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
        }))
        .unwrap();
        let err = envelope.into_result("0000.T").unwrap_err();
        assert!(matches!(err, AnalysisError::Provider(msg) if msg.contains("delisted")));
    }
}
