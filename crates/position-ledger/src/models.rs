use analysis_core::PositionContext;
use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// One share purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub company: String,
    pub price: Decimal,
    pub shares: Decimal,
    /// price × shares
    pub investment: Decimal,
    pub memo: String,
    pub industry: Option<String>,
    pub entry_pe: Option<f64>,
    /// Percent
    pub entry_roe: Option<f64>,
    /// Percent
    pub entry_equity_ratio: Option<f64>,
}

impl PurchaseRecord {
    pub fn new(
        date: NaiveDate,
        ticker: impl Into<String>,
        company: impl Into<String>,
        price: Decimal,
        shares: Decimal,
    ) -> LedgerResult<Self> {
        let ticker = ticker.into().trim().to_uppercase();
        if ticker.is_empty() {
            return Err(LedgerError::InvalidInput("ticker is empty".to_string()));
        }
        if price <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!("price must be positive, got {}", price)));
        }
        if shares <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!("shares must be positive, got {}", shares)));
        }

        Ok(Self {
            date,
            ticker,
            company: company.into().trim().to_string(),
            price,
            shares,
            investment: price * shares,
            memo: String::new(),
            industry: None,
            entry_pe: None,
            entry_roe: None,
            entry_equity_ratio: None,
        })
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        let industry = industry.into();
        self.industry = (!industry.trim().is_empty()).then_some(industry);
        self
    }

    pub fn with_entry_ratios(mut self, pe: Option<f64>, roe: Option<f64>, equity_ratio: Option<f64>) -> Self {
        self.entry_pe = pe.filter(|v| v.is_finite());
        self.entry_roe = roe.filter(|v| v.is_finite());
        self.entry_equity_ratio = equity_ratio.filter(|v| v.is_finite());
        self
    }
}

/// All purchases of one ticker rolled up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub company: String,
    pub total_shares: Decimal,
    /// Share-weighted average purchase price
    pub average_price: Decimal,
    pub total_investment: Decimal,
    pub first_purchase: NaiveDate,
    pub purchase_count: usize,
    pub industry: Option<String>,
    pub entry_pe: Option<f64>,
    pub entry_roe: Option<f64>,
    pub entry_equity_ratio: Option<f64>,
}

impl Position {
    pub fn to_context(&self) -> PositionContext {
        let ctx = PositionContext::new(
            self.ticker.clone(),
            self.average_price.to_f64().unwrap_or(0.0),
            self.total_shares.to_f64().unwrap_or(0.0),
        )
        .with_entry_date(self.first_purchase)
        .with_entry_ratios(self.entry_pe, self.entry_roe, self.entry_equity_ratio);

        match &self.industry {
            Some(industry) => ctx.with_industry(industry.clone()),
            None => ctx,
        }
    }
}

/// One amount-based fund purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundPurchase {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub unit_price: Decimal,
    /// amount / unit price
    pub units: Decimal,
    pub memo: String,
}

/// Units are kept to this many decimal places.
pub const FUND_UNIT_SCALE: u32 = 6;

impl FundPurchase {
    pub fn new(date: NaiveDate, amount: Decimal, unit_price: Decimal) -> LedgerResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!("amount must be positive, got {}", amount)));
        }
        if unit_price <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!("unit price must be positive, got {}", unit_price)));
        }

        Ok(Self {
            date,
            amount,
            unit_price,
            units: (amount / unit_price).round_dp(FUND_UNIT_SCALE),
            memo: String::new(),
        })
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundSummary {
    pub purchase_count: usize,
    pub total_investment: Decimal,
    pub total_units: Decimal,
    pub average_cost: Decimal,
    /// Present only when a current unit price was supplied.
    pub current_value: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub profit_percent: Option<f64>,
}
