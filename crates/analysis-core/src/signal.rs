use serde::{Deserialize, Serialize};

/// Signal family a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalCategory {
    Valuation,
    ProfitLoss,
    PricePosition,
    Profitability,
    FinancialHealth,
    Earnings,
    Momentum,
    MovingAverage,
    Trend,
    MacroRisk,
}

impl SignalCategory {
    pub fn to_label(&self) -> &'static str {
        match self {
            SignalCategory::Valuation => "Valuation",
            SignalCategory::ProfitLoss => "Unrealized P/L",
            SignalCategory::PricePosition => "Price Position",
            SignalCategory::Profitability => "Profitability",
            SignalCategory::FinancialHealth => "Financial Health",
            SignalCategory::Earnings => "Earnings",
            SignalCategory::Momentum => "Momentum",
            SignalCategory::MovingAverage => "Moving Average",
            SignalCategory::Trend => "Trend",
            SignalCategory::MacroRisk => "Macro Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn to_label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// One fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub category: SignalCategory,
    pub severity: Severity,
    pub message: String,
    pub detail: String,
    /// Contribution to the aggregate score; negative for penalizing rules.
    pub weight: i32,
}

impl Signal {
    pub fn new(
        category: SignalCategory,
        severity: Severity,
        weight: i32,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            detail: detail.into(),
            weight,
        }
    }
}
