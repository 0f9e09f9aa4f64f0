use serde::{Deserialize, Serialize};

/// Volatility index reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityBand {
    /// Below 15, complacent market
    Calm,
    Normal,
    Elevated,
    /// 30 and above
    Panic,
}

impl VolatilityBand {
    pub fn from_value(vix: f64) -> Self {
        match vix {
            v if v < 15.0 => VolatilityBand::Calm,
            v if v < 20.0 => VolatilityBand::Normal,
            v if v < 30.0 => VolatilityBand::Elevated,
            _ => VolatilityBand::Panic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VolatilityBand::Calm => "Calm",
            VolatilityBand::Normal => "Normal",
            VolatilityBand::Elevated => "Elevated",
            VolatilityBand::Panic => "Panic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldCurve {
    Normal,
    Inverted,
}

impl YieldCurve {
    pub fn from_spread(spread: f64) -> Self {
        if spread >= 0.0 {
            YieldCurve::Normal
        } else {
            YieldCurve::Inverted
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            YieldCurve::Normal => "Normal",
            YieldCurve::Inverted => "Inverted",
        }
    }
}

/// Market cap to GDP, percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffettBand {
    HistoricallyOvervalued,
    Overvalued,
    SlightlyOvervalued,
    Fair,
}

impl BuffettBand {
    pub fn from_value(ratio: f64) -> Self {
        match ratio {
            r if r > 200.0 => BuffettBand::HistoricallyOvervalued,
            r if r > 180.0 => BuffettBand::Overvalued,
            r if r > 150.0 => BuffettBand::SlightlyOvervalued,
            _ => BuffettBand::Fair,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuffettBand::HistoricallyOvervalued => "Historically Overvalued",
            BuffettBand::Overvalued => "Overvalued",
            BuffettBand::SlightlyOvervalued => "Slightly Overvalued",
            BuffettBand::Fair => "Fair",
        }
    }
}

/// Cyclically adjusted P/E
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShillerBand {
    HistoricallyOvervalued,
    Overvalued,
    SlightlyOvervalued,
    Fair,
    Undervalued,
}

impl ShillerBand {
    pub fn from_value(cape: f64) -> Self {
        match cape {
            c if c > 30.0 => ShillerBand::HistoricallyOvervalued,
            c if c > 25.0 => ShillerBand::Overvalued,
            c if c > 20.0 => ShillerBand::SlightlyOvervalued,
            c if c > 15.0 => ShillerBand::Fair,
            _ => ShillerBand::Undervalued,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShillerBand::HistoricallyOvervalued => "Historically Overvalued",
            ShillerBand::Overvalued => "Overvalued",
            ShillerBand::SlightlyOvervalued => "Slightly Overvalued",
            ShillerBand::Fair => "Fair",
            ShillerBand::Undervalued => "Undervalued",
        }
    }
}

/// Band labels for whichever readings are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroBands {
    pub volatility: Option<VolatilityBand>,
    pub yield_curve: Option<YieldCurve>,
    pub buffett: Option<BuffettBand>,
    pub shiller: Option<ShillerBand>,
}

impl MacroBands {
    pub fn from_snapshot(snapshot: &analysis_core::MacroSnapshot) -> Self {
        Self {
            volatility: snapshot.volatility_index.map(VolatilityBand::from_value),
            yield_curve: snapshot.yield_spread().map(YieldCurve::from_spread),
            buffett: snapshot.buffett_indicator.map(BuffettBand::from_value),
            shiller: snapshot.shiller_pe.map(ShillerBand::from_value),
        }
    }
}
