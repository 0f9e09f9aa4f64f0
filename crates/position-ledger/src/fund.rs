use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::prelude::*;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{FundPurchase, FundSummary};
use crate::purchases::DATE_FORMAT;
use crate::storage::{self, field};

pub const FUND_HEADER: [&str; 5] = ["date", "amount", "unit_price", "units", "memo"];

/// CSV log of amount-based mutual fund purchases.
#[derive(Debug, Clone)]
pub struct FundLedger {
    path: PathBuf,
}

impl FundLedger {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add(&self, purchase: &FundPurchase) -> LedgerResult<()> {
        storage::append_row(&self.path, &FUND_HEADER, &to_row(purchase))?;
        tracing::info!(
            "Recorded fund purchase: {} @ {} = {} units ({})",
            purchase.amount,
            purchase.unit_price,
            purchase.units,
            purchase.date
        );
        Ok(())
    }

    pub fn history(&self) -> LedgerResult<Vec<FundPurchase>> {
        let rows = storage::read_rows(&self.path)?;
        let mut purchases = Vec::with_capacity(rows.len());
        for (line, row) in rows.iter().enumerate() {
            match from_row(row) {
                Some(purchase) => purchases.push(purchase),
                None => tracing::warn!("Skipping malformed fund row {} in {}", line + 2, self.path.display()),
            }
        }
        Ok(purchases)
    }

    pub fn delete_last(&self) -> LedgerResult<Option<FundPurchase>> {
        let mut purchases = self.history()?;
        let removed = purchases.pop();
        if removed.is_some() {
            let rows: Vec<Vec<String>> = purchases.iter().map(to_row).collect();
            storage::rewrite(&self.path, &FUND_HEADER, &rows)?;
        }
        Ok(removed)
    }

    /// Totals across all purchases; valuation fields need `current_price`.
    ///
    /// Returns `None` when nothing has been bought yet.
    pub fn summary(&self, current_price: Option<Decimal>) -> LedgerResult<Option<FundSummary>> {
        summarize(&self.history()?, current_price)
    }
}

pub fn summarize(purchases: &[FundPurchase], current_price: Option<Decimal>) -> LedgerResult<Option<FundSummary>> {
    if let Some(price) = current_price {
        if price <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!("current price must be positive, got {}", price)));
        }
    }

    let total_investment: Decimal = purchases.iter().map(|p| p.amount).sum();
    let total_units: Decimal = purchases.iter().map(|p| p.units).sum();
    if purchases.is_empty() || total_units <= Decimal::ZERO {
        return Ok(None);
    }

    let average_cost = total_investment / total_units;
    let current_value = current_price.map(|price| total_units * price);
    let profit = current_value.map(|value| value - total_investment);
    let profit_percent = profit
        .filter(|_| total_investment > Decimal::ZERO)
        .and_then(|p| (p / total_investment * Decimal::ONE_HUNDRED).to_f64());

    Ok(Some(FundSummary {
        purchase_count: purchases.len(),
        total_investment,
        total_units,
        average_cost,
        current_value,
        profit,
        profit_percent,
    }))
}

fn to_row(purchase: &FundPurchase) -> Vec<String> {
    vec![
        purchase.date.format(DATE_FORMAT).to_string(),
        purchase.amount.to_string(),
        purchase.unit_price.to_string(),
        purchase.units.to_string(),
        purchase.memo.clone(),
    ]
}

fn from_row(row: &StringRecord) -> Option<FundPurchase> {
    let date = NaiveDate::parse_from_str(field(row, 0), DATE_FORMAT).ok()?;
    let amount = Decimal::from_str(field(row, 1)).ok()?;
    let unit_price = Decimal::from_str(field(row, 2)).ok()?;

    let mut purchase = FundPurchase::new(date, amount, unit_price).ok()?;
    if let Ok(units) = Decimal::from_str(field(row, 3)) {
        purchase.units = units;
    }
    Some(purchase.with_memo(field(row, 4)))
}
