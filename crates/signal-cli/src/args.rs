use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use position_ledger::purchases::DATE_FORMAT;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Flags that stand alone; every other `--name` consumes the next argument.
const SWITCHES: [&str; 2] = ["--json", "--help"];

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Sell(SellArgs),
    Timing { ticker: String, entry_pe: Option<f64> },
    Macro { buffett_indicator: Option<f64>, shiller_pe: Option<f64> },
    Portfolio,
    LedgerAdd(PurchaseArgs),
    LedgerList,
    LedgerPositions,
    LedgerUndo,
    FundAdd { date: Option<NaiveDate>, amount: Decimal, unit_price: Decimal, memo: String },
    FundList,
    FundUndo,
    FundSummary { unit_price: Option<Decimal> },
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SellArgs {
    pub ticker: String,
    /// Entry price and shares; when absent the position comes from the ledger.
    pub entry: Option<(f64, f64)>,
    pub industry: Option<String>,
    pub entry_pe: Option<f64>,
    pub entry_roe: Option<f64>,
    pub entry_equity_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseArgs {
    pub date: Option<NaiveDate>,
    pub ticker: String,
    pub company: String,
    pub price: Decimal,
    pub shares: Decimal,
    pub memo: String,
    pub industry: Option<String>,
    pub entry_pe: Option<f64>,
    pub entry_roe: Option<f64>,
    pub entry_equity_ratio: Option<f64>,
}

struct ArgList<'a> {
    args: &'a [String],
}

impl<'a> ArgList<'a> {
    fn has(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    fn value(&self, flag: &str) -> Option<&'a str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    fn parse<T>(&self, flag: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.value(flag) {
            Some(v) => Ok(Some(v.parse().with_context(|| format!("invalid value for {}: {}", flag, v))?)),
            None => Ok(None),
        }
    }

    fn require<T>(&self, flag: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.parse(flag)?.with_context(|| format!("missing required {}", flag))
    }

    fn text(&self, flag: &str) -> Option<String> {
        self.value(flag).map(str::to_string)
    }

    fn date(&self) -> Result<Option<NaiveDate>> {
        match self.value("--date") {
            Some(v) => Ok(Some(
                NaiveDate::parse_from_str(v, DATE_FORMAT).with_context(|| format!("--date must be YYYY-MM-DD, got {}", v))?,
            )),
            None => Ok(None),
        }
    }

    /// Bare words, skipping flags and the values they consume.
    fn positionals(&self) -> Vec<&'a str> {
        let mut words = Vec::new();
        let mut iter = self.args.iter();
        while let Some(arg) = iter.next() {
            if arg.starts_with("--") {
                if !SWITCHES.contains(&arg.as_str()) {
                    iter.next();
                }
            } else {
                words.push(arg.as_str());
            }
        }
        words
    }
}

/// Parse everything after the program name.
pub fn parse(args: &[String]) -> Result<Invocation> {
    let list = ArgList { args };
    let json = list.has("--json");
    let words = list.positionals();

    if list.has("--help") || words.is_empty() {
        return Ok(Invocation { command: Command::Help, json });
    }

    let ticker_at = |i: usize| -> Result<String> {
        words
            .get(i)
            .map(|t| t.to_string())
            .with_context(|| format!("{} needs a ticker", words[0]))
    };

    let command = match (words[0], words.get(1).copied()) {
        ("sell", _) => {
            let entry = match (list.parse::<f64>("--price")?, list.parse::<f64>("--shares")?) {
                (Some(price), Some(shares)) => Some((price, shares)),
                (None, None) => None,
                _ => bail!("--price and --shares must be given together"),
            };
            Command::Sell(SellArgs {
                ticker: ticker_at(1)?,
                entry,
                industry: list.text("--industry"),
                entry_pe: list.parse("--entry-pe")?,
                entry_roe: list.parse("--entry-roe")?,
                entry_equity_ratio: list.parse("--entry-equity")?,
            })
        }
        ("timing", _) => Command::Timing {
            ticker: ticker_at(1)?,
            entry_pe: list.parse("--pe")?,
        },
        ("macro", _) => Command::Macro {
            buffett_indicator: list.parse("--buffett")?,
            shiller_pe: list.parse("--shiller")?,
        },
        ("portfolio", _) => Command::Portfolio,
        ("ledger", Some("add")) => Command::LedgerAdd(PurchaseArgs {
            date: list.date()?,
            ticker: ticker_at(2)?,
            company: list.text("--company").unwrap_or_default(),
            price: list.require("--price")?,
            shares: list.require("--shares")?,
            memo: list.text("--memo").unwrap_or_default(),
            industry: list.text("--industry"),
            entry_pe: list.parse("--entry-pe")?,
            entry_roe: list.parse("--entry-roe")?,
            entry_equity_ratio: list.parse("--entry-equity")?,
        }),
        ("ledger", Some("list")) => Command::LedgerList,
        ("ledger", Some("positions")) => Command::LedgerPositions,
        ("ledger", Some("undo")) => Command::LedgerUndo,
        ("fund", Some("add")) => Command::FundAdd {
            date: list.date()?,
            amount: list.require("--amount")?,
            unit_price: list.require("--price")?,
            memo: list.text("--memo").unwrap_or_default(),
        },
        ("fund", Some("list")) => Command::FundList,
        ("fund", Some("undo")) => Command::FundUndo,
        ("fund", Some("summary")) => Command::FundSummary {
            unit_price: list.parse("--price")?,
        },
        (other, sub) => bail!(
            "unknown command: {}{}",
            other,
            sub.map(|s| format!(" {}", s)).unwrap_or_default()
        ),
    };

    Ok(Invocation { command, json })
}
