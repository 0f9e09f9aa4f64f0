use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

use crate::error::LedgerResult;
use crate::models::{Position, PurchaseRecord};
use crate::storage::{self, field, format_optional, optional_number, optional_text};

pub const PURCHASE_HEADER: [&str; 11] = [
    "date",
    "ticker",
    "company",
    "price",
    "shares",
    "investment",
    "memo",
    "industry",
    "entry_pe",
    "entry_roe",
    "entry_equity_ratio",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Append-only CSV log of share purchases.
#[derive(Debug, Clone)]
pub struct PurchaseLedger {
    path: PathBuf,
}

impl PurchaseLedger {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add(&self, record: &PurchaseRecord) -> LedgerResult<()> {
        storage::append_row(&self.path, &PURCHASE_HEADER, &to_row(record))?;
        tracing::info!(
            "Recorded purchase: {} x{} @ {} ({})",
            record.ticker,
            record.shares,
            record.price,
            record.date
        );
        Ok(())
    }

    /// Every readable record in file order. Malformed rows are skipped.
    pub fn history(&self) -> LedgerResult<Vec<PurchaseRecord>> {
        let rows = storage::read_rows(&self.path)?;
        let mut records = Vec::with_capacity(rows.len());
        for (line, row) in rows.iter().enumerate() {
            match from_row(row) {
                Some(record) => records.push(record),
                None => tracing::warn!("Skipping malformed purchase row {} in {}", line + 2, self.path.display()),
            }
        }
        Ok(records)
    }

    /// Remove and return the most recent record.
    pub fn delete_last(&self) -> LedgerResult<Option<PurchaseRecord>> {
        let mut records = self.history()?;
        let removed = records.pop();
        if let Some(record) = &removed {
            let rows: Vec<Vec<String>> = records.iter().map(to_row).collect();
            storage::rewrite(&self.path, &PURCHASE_HEADER, &rows)?;
            tracing::info!("Deleted last purchase: {} ({})", record.ticker, record.date);
        }
        Ok(removed)
    }

    /// Purchases grouped by ticker, in order of first appearance.
    pub fn positions(&self) -> LedgerResult<Vec<Position>> {
        Ok(aggregate_positions(&self.history()?))
    }
}

fn to_row(record: &PurchaseRecord) -> Vec<String> {
    vec![
        record.date.format(DATE_FORMAT).to_string(),
        record.ticker.clone(),
        record.company.clone(),
        record.price.to_string(),
        record.shares.to_string(),
        record.investment.to_string(),
        record.memo.clone(),
        record.industry.clone().unwrap_or_default(),
        format_optional(record.entry_pe),
        format_optional(record.entry_roe),
        format_optional(record.entry_equity_ratio),
    ]
}

fn from_row(row: &StringRecord) -> Option<PurchaseRecord> {
    let date = NaiveDate::parse_from_str(field(row, 0), DATE_FORMAT).ok()?;
    let price = Decimal::from_str(field(row, 3)).ok()?;
    let shares = Decimal::from_str(field(row, 4)).ok()?;

    let mut record = PurchaseRecord::new(date, field(row, 1), field(row, 2), price, shares).ok()?;
    if let Ok(investment) = Decimal::from_str(field(row, 5)) {
        record.investment = investment;
    }
    record.memo = field(row, 6).to_string();
    record.industry = optional_text(row, 7);
    Some(record.with_entry_ratios(
        optional_number(row, 8),
        optional_number(row, 9),
        optional_number(row, 10),
    ))
}

/// Roll purchases up per ticker: total shares, share-weighted average price,
/// earliest date, and the latest non-empty industry and entry ratios.
pub fn aggregate_positions(records: &[PurchaseRecord]) -> Vec<Position> {
    let mut order: Vec<String> = Vec::new();
    let mut by_ticker: HashMap<String, Position> = HashMap::new();

    for record in records {
        let position = by_ticker.entry(record.ticker.clone()).or_insert_with(|| {
            order.push(record.ticker.clone());
            Position {
                ticker: record.ticker.clone(),
                company: record.company.clone(),
                total_shares: Decimal::ZERO,
                average_price: Decimal::ZERO,
                total_investment: Decimal::ZERO,
                first_purchase: record.date,
                purchase_count: 0,
                industry: None,
                entry_pe: None,
                entry_roe: None,
                entry_equity_ratio: None,
            }
        });

        position.total_shares += record.shares;
        position.total_investment += record.price * record.shares;
        position.purchase_count += 1;
        position.first_purchase = position.first_purchase.min(record.date);
        if !record.company.is_empty() {
            position.company = record.company.clone();
        }
        if record.industry.is_some() {
            position.industry = record.industry.clone();
        }
        position.entry_pe = record.entry_pe.or(position.entry_pe);
        position.entry_roe = record.entry_roe.or(position.entry_roe);
        position.entry_equity_ratio = record.entry_equity_ratio.or(position.entry_equity_ratio);
    }

    order
        .into_iter()
        .filter_map(|ticker| by_ticker.remove(&ticker))
        .map(|mut position| {
            if position.total_shares > Decimal::ZERO {
                position.average_price = position.total_investment / position.total_shares;
            }
            position
        })
        .collect()
}
