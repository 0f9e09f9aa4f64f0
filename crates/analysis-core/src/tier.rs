use serde::{Deserialize, Serialize};

/// Recommendation tier for an existing holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellTier {
    NoIssue,
    MinorConcern,
    Caution,
    ConsiderSelling,
    StrongSell,
}

impl SellTier {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 8 => SellTier::StrongSell,
            s if s >= 6 => SellTier::ConsiderSelling,
            s if s >= 4 => SellTier::Caution,
            s if s >= 2 => SellTier::MinorConcern,
            _ => SellTier::NoIssue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SellTier::StrongSell => "Strong Sell",
            SellTier::ConsiderSelling => "Consider Selling",
            SellTier::Caution => "Caution",
            SellTier::MinorConcern => "Minor Concern",
            SellTier::NoIssue => "No Issue",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            SellTier::StrongSell => "Consider selling immediately",
            SellTier::ConsiderSelling => "Review the details and decide within a week",
            SellTier::Caution => "Monitor closely; consider selling if it worsens",
            SellTier::MinorConcern => "Check periodically",
            SellTier::NoIssue => "Keep holding",
        }
    }
}

/// Recommendation tier for a new purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingTier {
    AvoidBuying,
    Neutral,
    SlightBuy,
    Buy,
    StrongBuy,
}

impl TimingTier {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 8 => TimingTier::StrongBuy,
            s if s >= 6 => TimingTier::Buy,
            s if s >= 4 => TimingTier::SlightBuy,
            s if s >= 2 => TimingTier::Neutral,
            _ => TimingTier::AvoidBuying,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimingTier::StrongBuy => "Strong Buy",
            TimingTier::Buy => "Buy",
            TimingTier::SlightBuy => "Slight Buy",
            TimingTier::Neutral => "Neutral",
            TimingTier::AvoidBuying => "Avoid Buying",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            TimingTier::StrongBuy => "Commit about 60% of this month's budget",
            TimingTier::Buy => "Commit about 40% of this month's budget",
            TimingTier::SlightBuy => "Start with a small position and watch",
            TimingTier::Neutral => "Wait and see",
            TimingTier::AvoidBuying => "Wait for a pullback",
        }
    }
}

/// Market-wide alert level derived from the 0-9 danger score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerTier {
    Low,
    Moderate,
    High,
    Maximum,
}

impl DangerTier {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 7 => DangerTier::Maximum,
            s if s >= 5 => DangerTier::High,
            s if s >= 3 => DangerTier::Moderate,
            _ => DangerTier::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DangerTier::Maximum => "Maximum Alert",
            DangerTier::High => "High Alert",
            DangerTier::Moderate => "Moderate Alert",
            DangerTier::Low => "Low Alert",
        }
    }

    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            DangerTier::Maximum => &[
                "Consider cutting losses immediately",
                "Review every position",
                "Raise cash to 60% or more",
            ],
            DangerTier::High => &[
                "Pause new purchases",
                "Hold existing positions without adding",
                "Secure cash",
            ],
            DangerTier::Moderate => &[
                "Act cautiously",
                "Keep holding",
                "Limit additions to small amounts",
            ],
            DangerTier::Low => &[
                "Act as normal",
                "Keep holding",
                "Follow the plan",
            ],
        }
    }
}

/// Terminal state of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "tier", rename_all = "snake_case")]
pub enum Tier {
    Sell(SellTier),
    Timing(TimingTier),
    /// The provider failed or timed out.
    DataUnavailable,
    /// Not enough price history to compute timing indicators.
    InsufficientData,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Sell(t) => t.label(),
            Tier::Timing(t) => t.label(),
            Tier::DataUnavailable => "Data Unavailable",
            Tier::InsufficientData => "Insufficient Data",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Tier::Sell(t) => t.action(),
            Tier::Timing(t) => t.action(),
            Tier::DataUnavailable => "Retry once market data is reachable",
            Tier::InsufficientData => "Wait until more price history is available",
        }
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Tier::DataUnavailable | Tier::InsufficientData)
    }
}
