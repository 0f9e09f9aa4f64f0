use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSet;
use crate::signal::Signal;
use crate::tier::{SellTier, Tier, TimingTier};

/// Maximum timing score; sell scores have no ceiling.
pub const TIMING_SCORE_CAP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationKind {
    Sell,
    Timing,
}

/// Collects fired signals in rule order.
#[derive(Debug, Default, Clone)]
pub struct Scorecard {
    signals: Vec<Signal>,
}

impl Scorecard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rule outcome; `None` means the rule did not fire.
    pub fn push(&mut self, outcome: Option<Signal>) {
        if let Some(signal) = outcome {
            self.signals.push(signal);
        }
    }

    pub fn raw_total(&self) -> i32 {
        self.signals.iter().map(|s| s.weight).sum()
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn into_sell_result(
        self,
        ticker: impl Into<String>,
        indicators: IndicatorSet,
        return_rate: Option<f64>,
    ) -> EvaluationResult {
        let score = self.raw_total().max(0);
        let tier = SellTier::from_score(score);
        EvaluationResult {
            kind: EvaluationKind::Sell,
            ticker: ticker.into(),
            score,
            tier: Tier::Sell(tier),
            label: tier.label().to_string(),
            action: tier.action().to_string(),
            signals: self.signals,
            return_rate,
            indicators,
        }
    }

    pub fn into_timing_result(self, ticker: impl Into<String>, indicators: IndicatorSet) -> EvaluationResult {
        let score = self.raw_total().min(TIMING_SCORE_CAP);
        let tier = TimingTier::from_score(score);
        EvaluationResult {
            kind: EvaluationKind::Timing,
            ticker: ticker.into(),
            score,
            tier: Tier::Timing(tier),
            label: tier.label().to_string(),
            action: tier.action().to_string(),
            signals: self.signals,
            return_rate: None,
            indicators,
        }
    }
}

/// Outcome of one sell or timing evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub kind: EvaluationKind,
    pub ticker: String,
    pub score: i32,
    pub tier: Tier,
    pub label: String,
    pub action: String,
    pub signals: Vec<Signal>,
    /// Unrealized return in percent (sell side only).
    pub return_rate: Option<f64>,
    pub indicators: IndicatorSet,
}

impl EvaluationResult {
    fn terminal(kind: EvaluationKind, ticker: impl Into<String>, tier: Tier) -> Self {
        Self {
            kind,
            ticker: ticker.into(),
            score: 0,
            tier,
            label: tier.label().to_string(),
            action: tier.action().to_string(),
            signals: Vec::new(),
            return_rate: None,
            indicators: IndicatorSet::default(),
        }
    }

    pub fn data_unavailable(kind: EvaluationKind, ticker: impl Into<String>) -> Self {
        Self::terminal(kind, ticker, Tier::DataUnavailable)
    }

    pub fn insufficient_data(kind: EvaluationKind, ticker: impl Into<String>) -> Self {
        Self::terminal(kind, ticker, Tier::InsufficientData)
    }

    /// Score clamped to the 0-10 display range.
    pub fn display_score(&self) -> i32 {
        self.score.clamp(0, 10)
    }

    pub fn is_available(&self) -> bool {
        !self.tier.is_terminal_failure()
    }
}
