//! position-signals: sell checks, buy timing and market danger level for a
//! Japanese equity portfolio, plus the purchase ledgers they read from.
//!
//! Usage:
//!   position-signals sell 7203 --price 2870 --shares 100 [--industry 海運業] [--entry-pe 9.5]
//!   position-signals sell 7203                 # entry taken from the purchase ledger
//!   position-signals timing 9101 [--pe 8.2]
//!   position-signals macro [--buffett 190] [--shiller 33]
//!   position-signals portfolio                 # sell check for every ledger position
//!   position-signals ledger add 7203 --price 2870 --shares 100 [--company Toyota] [--date 2024-01-10] [--memo ..]
//!   position-signals ledger list|positions|undo
//!   position-signals fund add --amount 30000 --price 25000 [--date ..] [--memo ..]
//!   position-signals fund list|undo
//!   position-signals fund summary [--price 24000]
//!
//! Add `--json` to any command for machine-readable output.

mod args;
mod config;
mod report;

use analysis_core::PositionContext;
use analysis_orchestrator::{MacroInputs, SignalOrchestrator};
use anyhow::{Context, Result};
use args::{Command, Invocation, PurchaseArgs, SellArgs};
use chrono::Local;
use config::AppConfig;
use market_data_client::{normalize_ticker, CachedProvider, YahooFinanceClient};
use position_ledger::{FundLedger, FundPurchase, PurchaseLedger, PurchaseRecord};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so `--json` output stays parseable.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let invocation = args::parse(&argv)?;
    let config = AppConfig::from_env()?;

    run(invocation, &config).await
}

fn build_orchestrator(config: &AppConfig) -> SignalOrchestrator {
    let client = YahooFinanceClient::new()
        .with_base_url(config.market_data_base_url.clone())
        .with_ticker_suffix(config.ticker_suffix.clone())
        .with_rate_limit(config.rate_limit_per_min);
    let provider = Arc::new(CachedProvider::with_ttl(client, config.cache_ttl_secs));

    SignalOrchestrator::builder()
        .market_data(provider.clone())
        .macro_data(provider)
        .fetch_timeout(Duration::from_secs(config.fetch_timeout_secs))
        .history_lookback_days(config.history_lookback_days)
        .build()
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

async fn run(invocation: Invocation, config: &AppConfig) -> Result<()> {
    tracing::debug!("Running {:?}", invocation.command);
    let json = invocation.json;
    let purchases = PurchaseLedger::open(&config.ledger_path);
    let funds = FundLedger::open(&config.fund_ledger_path);

    match invocation.command {
        Command::Help => {
            println!("{}", USAGE);
        }
        Command::Sell(sell) => {
            let position = sell_context(sell, &purchases, config)?;
            let result = build_orchestrator(config).evaluate_sell(&position).await?;
            emit(json, &result, report::evaluation)?;
        }
        Command::Timing { ticker, entry_pe } => {
            let result = build_orchestrator(config).evaluate_timing(&ticker, entry_pe).await?;
            emit(json, &result, report::evaluation)?;
        }
        Command::Macro {
            buffett_indicator,
            shiller_pe,
        } => {
            let inputs = MacroInputs {
                buffett_indicator: buffett_indicator.or(config.buffett_indicator),
                shiller_pe: shiller_pe.or(config.shiller_pe),
            };
            let assessment = build_orchestrator(config).evaluate_macro(&inputs).await?;
            emit(json, &assessment, report::danger)?;
        }
        Command::Portfolio => {
            let contexts: Vec<PositionContext> = purchases.positions()?.iter().map(|p| p.to_context()).collect();
            let results = build_orchestrator(config).evaluate_portfolio(&contexts).await?;
            emit(json, &results, |r| report::portfolio(r))?;
        }
        Command::LedgerAdd(add) => {
            let record = purchase_record(add)?;
            purchases.add(&record)?;
            emit(json, &record, |r| report::purchases(std::slice::from_ref(r)))?;
        }
        Command::LedgerList => {
            let history = purchases.history()?;
            emit(json, &history, |h| report::purchases(h))?;
        }
        Command::LedgerPositions => {
            let positions = purchases.positions()?;
            emit(json, &positions, |p| report::positions(p))?;
        }
        Command::LedgerUndo => {
            let removed = purchases.delete_last()?;
            emit(json, &removed, |r| match r {
                Some(record) => format!("Removed: {}", report::purchases(std::slice::from_ref(record))),
                None => "Nothing to remove.\n".to_string(),
            })?;
        }
        Command::FundAdd {
            date,
            amount,
            unit_price,
            memo,
        } => {
            let purchase = FundPurchase::new(date.unwrap_or_else(|| Local::now().date_naive()), amount, unit_price)?
                .with_memo(memo);
            funds.add(&purchase)?;
            emit(json, &purchase, |p| report::fund_purchases(std::slice::from_ref(p)))?;
        }
        Command::FundList => {
            let history = funds.history()?;
            emit(json, &history, |h| report::fund_purchases(h))?;
        }
        Command::FundUndo => {
            let removed = funds.delete_last()?;
            emit(json, &removed, |r| match r {
                Some(purchase) => format!("Removed: {}", report::fund_purchases(std::slice::from_ref(purchase))),
                None => "Nothing to remove.\n".to_string(),
            })?;
        }
        Command::FundSummary { unit_price } => {
            let summary = funds.summary(unit_price)?;
            emit(json, &summary, |s| report::fund_summary(s.as_ref()))?;
        }
    }

    Ok(())
}

/// Position for a sell check: explicit entry flags win, otherwise the ledger's
/// aggregate for the same ticker.
fn sell_context(sell: SellArgs, ledger: &PurchaseLedger, config: &AppConfig) -> Result<PositionContext> {
    let base = match sell.entry {
        Some((price, shares)) => PositionContext::new(sell.ticker.clone(), price, shares),
        None => {
            let wanted = normalize_ticker(&sell.ticker, &config.ticker_suffix);
            let position = ledger
                .positions()?
                .into_iter()
                .find(|p| normalize_ticker(&p.ticker, &config.ticker_suffix) == wanted)
                .with_context(|| {
                    format!(
                        "{} is not in {}; pass --price and --shares",
                        sell.ticker,
                        ledger.path().display()
                    )
                })?;
            position.to_context()
        }
    };

    let entry_pe = sell.entry_pe.or(base.entry_pe);
    let entry_roe = sell.entry_roe.or(base.entry_roe);
    let entry_equity_ratio = sell.entry_equity_ratio.or(base.entry_equity_ratio);
    let ctx = base.with_entry_ratios(entry_pe, entry_roe, entry_equity_ratio);

    Ok(match sell.industry {
        Some(industry) => ctx.with_industry(industry),
        None => ctx,
    })
}

fn purchase_record(add: PurchaseArgs) -> Result<PurchaseRecord> {
    let date = add.date.unwrap_or_else(|| Local::now().date_naive());
    let mut record = PurchaseRecord::new(date, add.ticker, add.company, add.price, add.shares)?
        .with_memo(add.memo)
        .with_entry_ratios(add.entry_pe, add.entry_roe, add.entry_equity_ratio);
    if let Some(industry) = add.industry {
        record = record.with_industry(industry);
    }
    Ok(record)
}

const USAGE: &str = "\
position-signals <command> [options] [--json]

Commands:
  sell <ticker> [--price P --shares N] [--industry I] [--entry-pe X] [--entry-roe X] [--entry-equity X]
  timing <ticker> [--pe X]
  macro [--buffett X] [--shiller X]
  portfolio
  ledger add <ticker> --price P --shares N [--company C] [--date YYYY-MM-DD] [--memo M] [--industry I]
  ledger list | positions | undo
  fund add --amount A --price P [--date YYYY-MM-DD] [--memo M]
  fund list | undo | summary [--price P]

Environment:
  MARKET_DATA_BASE_URL, TICKER_SUFFIX, FETCH_TIMEOUT_SECS, CACHE_TTL_SECS,
  HISTORY_LOOKBACK_DAYS, RATE_LIMIT_PER_MIN, LEDGER_PATH, FUND_LEDGER_PATH,
  BUFFETT_INDICATOR, SHILLER_PE, RUST_LOG, RUST_LOG_FORMAT=json";
