use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize::RawValue;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Closing prices in chronological order, skipping non-finite closes.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).filter(|c| c.is_finite()).collect()
}

/// Balance sheet line items for one reporting period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBalanceSheet {
    pub total_assets: RawValue,
    pub stockholders_equity: RawValue,
}

/// Income statement line items for one reporting period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIncomeStatement {
    pub total_revenue: RawValue,
    pub operating_income: RawValue,
}

/// Everything the quote provider returns for one ticker, unsanitized.
///
/// Statements are ordered newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuote {
    pub symbol: String,
    pub name: Option<String>,
    pub current_price: RawValue,
    pub fifty_two_week_high: RawValue,
    pub fifty_two_week_low: RawValue,
    pub trailing_pe: RawValue,
    pub price_to_book: RawValue,
    /// Fraction, e.g. 0.185 for 18.5%
    pub return_on_equity: RawValue,
    pub dividend_yield: RawValue,
    pub market_cap: RawValue,
    pub balance_sheets: Vec<RawBalanceSheet>,
    pub income_statements: Vec<RawIncomeStatement>,
}

/// Position-specific facts that are not part of the market data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionContext {
    pub ticker: String,
    pub entry_price: f64,
    pub shares: f64,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub entry_pe: Option<f64>,
    /// Percent
    #[serde(default)]
    pub entry_roe: Option<f64>,
    /// Percent
    #[serde(default)]
    pub entry_equity_ratio: Option<f64>,
}

impl PositionContext {
    pub fn new(ticker: impl Into<String>, entry_price: f64, shares: f64) -> Self {
        Self {
            ticker: ticker.into(),
            entry_price,
            shares,
            entry_date: None,
            industry: None,
            entry_pe: None,
            entry_roe: None,
            entry_equity_ratio: None,
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_entry_ratios(mut self, pe: Option<f64>, roe: Option<f64>, equity_ratio: Option<f64>) -> Self {
        self.entry_pe = pe;
        self.entry_roe = roe;
        self.entry_equity_ratio = equity_ratio;
        self
    }

    pub fn with_entry_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }
}

/// Market-wide readings used by the danger level.
///
/// Yields and the volatility index come from the macro provider; the Buffett
/// indicator and Shiller P/E are entered by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSnapshot {
    pub ten_year_yield: Option<f64>,
    pub short_yield: Option<f64>,
    pub volatility_index: Option<f64>,
    pub buffett_indicator: Option<f64>,
    pub shiller_pe: Option<f64>,
}

impl MacroSnapshot {
    /// Long minus short yield, in percentage points.
    pub fn yield_spread(&self) -> Option<f64> {
        match (self.ten_year_yield, self.short_yield) {
            (Some(long), Some(short)) => Some(long - short),
            _ => None,
        }
    }

    /// Fill the hand-entered valuation ratios, keeping provider readings.
    pub fn with_manual(mut self, buffett_indicator: Option<f64>, shiller_pe: Option<f64>) -> Self {
        self.buffett_indicator = buffett_indicator.filter(|v| v.is_finite());
        self.shiller_pe = shiller_pe.filter(|v| v.is_finite());
        self
    }
}
