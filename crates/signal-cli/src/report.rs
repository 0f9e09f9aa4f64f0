//! Plain-text rendering for terminal output. `--json` bypasses this module.

use std::fmt::Write;

use analysis_core::{EvaluationKind, EvaluationResult, Signal};
use macro_risk::DangerAssessment;
use position_ledger::{FundPurchase, FundSummary, Position, PurchaseRecord};

fn push_signals(out: &mut String, signals: &[Signal]) {
    for signal in signals {
        let _ = writeln!(
            out,
            "  [{:+}] {} / {}: {} ({})",
            signal.weight,
            signal.category.to_label(),
            signal.severity.to_label(),
            signal.message,
            signal.detail
        );
    }
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    value.map(|v| format!("{:.2}{}", v, suffix)).unwrap_or_else(|| "-".to_string())
}

pub fn evaluation(result: &EvaluationResult) -> String {
    let mut out = String::new();
    let kind = match result.kind {
        EvaluationKind::Sell => "Sell check",
        EvaluationKind::Timing => "Buy timing",
    };

    if !result.is_available() {
        let _ = writeln!(out, "{} {}: {}", kind, result.ticker, result.label);
        let _ = writeln!(out, "  -> {}", result.action);
        return out;
    }

    let _ = writeln!(
        out,
        "{} {}: {}/10 {} (raw {})",
        kind,
        result.ticker,
        result.display_score(),
        result.label,
        result.score
    );
    let ind = &result.indicators;
    let _ = writeln!(
        out,
        "  price {}  P/E {}  P/B {}  RSI {}",
        fmt_opt(ind.current_price(), ""),
        fmt_opt(ind.trailing_pe(), ""),
        fmt_opt(ind.price_to_book(), ""),
        fmt_opt(ind.rsi(), "")
    );
    if result.kind == EvaluationKind::Sell {
        let _ = writeln!(out, "  return {}", fmt_opt(result.return_rate, "%"));
    }
    push_signals(&mut out, &result.signals);
    let _ = writeln!(out, "  -> {}", result.action);
    out
}

pub fn danger(assessment: &DangerAssessment) -> String {
    let mut out = String::new();
    let snapshot = &assessment.snapshot;
    let _ = writeln!(out, "Danger level: {}/9 {}", assessment.score, assessment.label);
    let _ = writeln!(
        out,
        "  10y {}  short {}  spread {}  VIX {}  Buffett {}  Shiller P/E {}",
        fmt_opt(snapshot.ten_year_yield, "%"),
        fmt_opt(snapshot.short_yield, "%"),
        fmt_opt(snapshot.yield_spread(), "pt"),
        fmt_opt(snapshot.volatility_index, ""),
        fmt_opt(snapshot.buffett_indicator, "%"),
        fmt_opt(snapshot.shiller_pe, "")
    );
    push_signals(&mut out, &assessment.signals);
    for action in &assessment.actions {
        let _ = writeln!(out, "  -> {}", action);
    }
    out
}

pub fn portfolio(results: &[EvaluationResult]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        out.push_str("No positions recorded.\n");
        return out;
    }
    for result in results {
        out.push_str(&evaluation(result));
    }
    let alerts = results.iter().filter(|r| r.is_available() && r.score >= 6).count();
    let _ = writeln!(out, "{} positions, {} flagged for selling", results.len(), alerts);
    out
}

pub fn purchases(records: &[PurchaseRecord]) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No purchases recorded.\n");
        return out;
    }
    for r in records {
        let _ = writeln!(
            out,
            "{}  {:<8} {:<16} {:>10} x {:<8} = {:>12}  {}",
            r.date, r.ticker, r.company, r.price, r.shares, r.investment, r.memo
        );
    }
    out
}

pub fn positions(positions: &[Position]) -> String {
    let mut out = String::new();
    if positions.is_empty() {
        out.push_str("No positions recorded.\n");
        return out;
    }
    for p in positions {
        let _ = writeln!(
            out,
            "{:<8} {:<16} {:>8} shares @ {:.2}  since {} ({} buys)",
            p.ticker, p.company, p.total_shares, p.average_price, p.first_purchase, p.purchase_count
        );
    }
    out
}

pub fn fund_purchases(purchases: &[FundPurchase]) -> String {
    let mut out = String::new();
    if purchases.is_empty() {
        out.push_str("No fund purchases recorded.\n");
        return out;
    }
    for p in purchases {
        let _ = writeln!(
            out,
            "{}  {:>10} @ {:>10} = {:>12} units  {}",
            p.date, p.amount, p.unit_price, p.units, p.memo
        );
    }
    out
}

pub fn fund_summary(summary: Option<&FundSummary>) -> String {
    let Some(s) = summary else {
        return "No fund purchases recorded.\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} purchases, invested {}, {} units, average cost {:.2}",
        s.purchase_count, s.total_investment, s.total_units, s.average_cost
    );
    if let (Some(value), Some(profit)) = (s.current_value, s.profit) {
        let _ = writeln!(
            out,
            "  value {:.0}  profit {:.0} ({})",
            value,
            profit,
            fmt_opt(s.profit_percent, "%")
        );
    }
    out
}
