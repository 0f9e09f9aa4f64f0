use analysis_core::{IndicatorSet, PositionContext, Severity, Signal, SignalCategory};

use crate::cyclical::is_cyclical;
use crate::ratios::{calculate_52_week_position, calculate_unrealized_return};

pub const CYCLICAL_PE_CEILING: f64 = 15.0;
pub const CYCLICAL_PE_WARNING: f64 = 12.0;
pub const LOSS_CUT_THRESHOLD: f64 = -20.0;
pub const PROFIT_TAKE_THRESHOLD: f64 = 50.0;
pub const NEAR_HIGH_POSITION: f64 = 90.0;
pub const ROE_DRIFT_LIMIT: f64 = -5.0;
pub const EQUITY_DRIFT_LIMIT: f64 = -10.0;
pub const REVENUE_DECLINE_LIMIT: f64 = -10.0;
pub const OPERATING_INCOME_DECLINE_LIMIT: f64 = -20.0;

/// P/E of a cyclical holding, only when positive.
fn cyclical_pe(ind: &IndicatorSet, ctx: &PositionContext) -> Option<f64> {
    let industry = ctx.industry.as_deref()?;
    if !is_cyclical(industry) {
        return None;
    }
    ind.trailing_pe().filter(|pe| *pe > 0.0)
}

pub fn cyclical_pe_ceiling_rule(ind: &IndicatorSet, ctx: &PositionContext) -> Option<Signal> {
    let pe = cyclical_pe(ind, ctx)?;
    if pe > CYCLICAL_PE_CEILING {
        return Some(Signal::new(
            SignalCategory::Valuation,
            Severity::High,
            3,
            "Cyclical stock above its P/E ceiling",
            format!("P/E {:.1} > {:.0} for a cyclical sector", pe, CYCLICAL_PE_CEILING),
        ));
    }
    None
}

pub fn cyclical_pe_warning_rule(ind: &IndicatorSet, ctx: &PositionContext) -> Option<Signal> {
    let pe = cyclical_pe(ind, ctx)?;
    if pe > CYCLICAL_PE_WARNING && pe <= CYCLICAL_PE_CEILING {
        return Some(Signal::new(
            SignalCategory::Valuation,
            Severity::Medium,
            2,
            "Cyclical stock approaching its P/E ceiling",
            format!("P/E {:.1} between {:.0} and {:.0}", pe, CYCLICAL_PE_WARNING, CYCLICAL_PE_CEILING),
        ));
    }
    None
}

pub fn unrealized_loss_rule(ind: &IndicatorSet, ctx: &PositionContext) -> Option<Signal> {
    let rate = calculate_unrealized_return(ind.current_price(), ctx.entry_price, ctx.shares)?;
    if rate < LOSS_CUT_THRESHOLD {
        return Some(Signal::new(
            SignalCategory::ProfitLoss,
            Severity::High,
            3,
            "Loss-cut line breached",
            format!("unrealized return {:.1}% < {:.0}%", rate, LOSS_CUT_THRESHOLD),
        ));
    }
    None
}

pub fn unrealized_gain_rule(ind: &IndicatorSet, ctx: &PositionContext) -> Option<Signal> {
    let rate = calculate_unrealized_return(ind.current_price(), ctx.entry_price, ctx.shares)?;
    if rate > PROFIT_TAKE_THRESHOLD {
        return Some(Signal::new(
            SignalCategory::ProfitLoss,
            Severity::Medium,
            2,
            "Profit-taking level reached",
            format!("unrealized return +{:.1}% > +{:.0}%", rate, PROFIT_TAKE_THRESHOLD),
        ));
    }
    None
}

pub fn near_high_rule(ind: &IndicatorSet, _ctx: &PositionContext) -> Option<Signal> {
    let position = calculate_52_week_position(
        ind.current_price(),
        ind.fifty_two_week_low(),
        ind.fifty_two_week_high(),
    )?;
    if position > NEAR_HIGH_POSITION {
        return Some(Signal::new(
            SignalCategory::PricePosition,
            Severity::Medium,
            2,
            "Trading near its 52-week high",
            format!("{:.0}% of the 52-week range", position),
        ));
    }
    None
}

pub fn roe_drift_rule(ind: &IndicatorSet, ctx: &PositionContext) -> Option<Signal> {
    let (current, entry) = (ind.roe()?, ctx.entry_roe?);
    let drift = current - entry;
    if drift < ROE_DRIFT_LIMIT {
        return Some(Signal::new(
            SignalCategory::Profitability,
            Severity::High,
            3,
            "ROE deteriorated since purchase",
            format!("ROE {:.1}% -> {:.1}% ({:+.1}pt)", entry, current, drift),
        ));
    }
    None
}

pub fn equity_drift_rule(ind: &IndicatorSet, ctx: &PositionContext) -> Option<Signal> {
    let (current, entry) = (ind.equity_ratio()?, ctx.entry_equity_ratio?);
    let drift = current - entry;
    if drift < EQUITY_DRIFT_LIMIT {
        return Some(Signal::new(
            SignalCategory::FinancialHealth,
            Severity::High,
            3,
            "Equity ratio deteriorated since purchase",
            format!("equity ratio {:.1}% -> {:.1}% ({:+.1}pt)", entry, current, drift),
        ));
    }
    None
}

pub fn revenue_decline_rule(ind: &IndicatorSet, _ctx: &PositionContext) -> Option<Signal> {
    let growth = ind.revenue_growth()?;
    if growth < REVENUE_DECLINE_LIMIT {
        return Some(Signal::new(
            SignalCategory::Earnings,
            Severity::Medium,
            2,
            "Revenue declining",
            format!("revenue growth {:.1}%", growth),
        ));
    }
    None
}

pub fn operating_income_decline_rule(ind: &IndicatorSet, _ctx: &PositionContext) -> Option<Signal> {
    let growth = ind.operating_income_growth()?;
    if growth < OPERATING_INCOME_DECLINE_LIMIT {
        return Some(Signal::new(
            SignalCategory::Earnings,
            Severity::High,
            3,
            "Operating income falling sharply",
            format!("operating income growth {:.1}%", growth),
        ));
    }
    None
}

pub type SellRule = fn(&IndicatorSet, &PositionContext) -> Option<Signal>;

/// Rule order is the order signals appear in the result.
pub const SELL_RULES: [SellRule; 9] = [
    cyclical_pe_ceiling_rule,
    cyclical_pe_warning_rule,
    unrealized_loss_rule,
    unrealized_gain_rule,
    near_high_rule,
    roe_drift_rule,
    equity_drift_rule,
    revenue_decline_rule,
    operating_income_decline_rule,
];
