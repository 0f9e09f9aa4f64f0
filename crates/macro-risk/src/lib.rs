//! Market-wide danger level.
//!
//! Three independent readings each contribute up to 3 points: the yield-curve
//! spread, the volatility index and the Buffett indicator. The 0-9 total maps
//! to an alert tier with a fixed list of recommended actions.

pub mod bands;

use analysis_core::{DangerTier, MacroSnapshot, Severity, Signal, SignalCategory};
use serde::{Deserialize, Serialize};

pub use bands::*;

/// Volatility index level above which panic selling is treated as an entry point.
pub const VOLATILITY_OPPORTUNITY_LEVEL: f64 = 30.0;

pub const OPPORTUNITY_ACTION: &str = "Volatility spike: consider deploying reserve cash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DangerAssessment {
    /// 0-9
    pub score: i32,
    pub tier: DangerTier,
    pub label: String,
    pub actions: Vec<String>,
    /// One entry per reading that contributed points.
    pub signals: Vec<Signal>,
    pub buying_opportunity: bool,
    pub bands: MacroBands,
    pub snapshot: MacroSnapshot,
}

impl DangerAssessment {
    pub fn is_alert(&self) -> bool {
        self.tier >= DangerTier::Moderate
    }
}

fn severity_for(points: i32) -> Severity {
    match points {
        3 => Severity::High,
        2 => Severity::Medium,
        _ => Severity::Low,
    }
}

pub fn yield_spread_signal(snapshot: &MacroSnapshot) -> Option<Signal> {
    let spread = snapshot.yield_spread()?;
    let (points, message) = match spread {
        s if s < -0.5 => (3, "Yield curve deeply inverted"),
        s if s < 0.0 => (2, "Yield curve inverted"),
        _ => return None,
    };
    Some(Signal::new(
        SignalCategory::MacroRisk,
        severity_for(points),
        points,
        message,
        format!("spread {:+.2}pt", spread),
    ))
}

pub fn volatility_signal(snapshot: &MacroSnapshot) -> Option<Signal> {
    let vix = snapshot.volatility_index?;
    let (points, message) = match vix {
        v if v > 30.0 => (3, "Volatility in panic territory"),
        v if v > 25.0 => (2, "Volatility elevated"),
        v if v > 20.0 => (1, "Volatility rising"),
        _ => return None,
    };
    Some(Signal::new(
        SignalCategory::MacroRisk,
        severity_for(points),
        points,
        message,
        format!("volatility index {:.1}", vix),
    ))
}

pub fn buffett_signal(snapshot: &MacroSnapshot) -> Option<Signal> {
    let ratio = snapshot.buffett_indicator?;
    let (points, message) = match ratio {
        r if r > 200.0 => (3, "Market cap to GDP at historic extreme"),
        r if r > 180.0 => (2, "Market cap to GDP overvalued"),
        r if r > 150.0 => (1, "Market cap to GDP slightly overvalued"),
        _ => return None,
    };
    Some(Signal::new(
        SignalCategory::MacroRisk,
        severity_for(points),
        points,
        message,
        format!("Buffett indicator {:.0}%", ratio),
    ))
}

/// Compute the danger level for one macro snapshot. Missing readings add nothing.
pub fn assess_danger(snapshot: &MacroSnapshot) -> DangerAssessment {
    let signals: Vec<Signal> = [
        yield_spread_signal(snapshot),
        volatility_signal(snapshot),
        buffett_signal(snapshot),
    ]
    .into_iter()
    .flatten()
    .collect();

    let score: i32 = signals.iter().map(|s| s.weight).sum();
    let tier = DangerTier::from_score(score);
    let buying_opportunity = snapshot
        .volatility_index
        .is_some_and(|v| v > VOLATILITY_OPPORTUNITY_LEVEL);

    let mut actions: Vec<String> = tier.actions().iter().map(|a| a.to_string()).collect();
    if buying_opportunity {
        actions.push(OPPORTUNITY_ACTION.to_string());
    }

    DangerAssessment {
        score,
        tier,
        label: tier.label().to_string(),
        actions,
        signals,
        buying_opportunity,
        bands: MacroBands::from_snapshot(snapshot),
        snapshot: *snapshot,
    }
}
