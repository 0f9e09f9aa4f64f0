use analysis_core::{
    EvaluationResult, IndicatorSet, IndicatorSetBuilder, Scorecard, Severity, Signal,
    SignalCategory,
};

use crate::indicators::{rsi, sma_last, RSI_PERIOD};

/// Minimum number of daily closes before timing indicators are computed.
pub const MIN_TIMING_HISTORY: usize = 30;

pub const MA_SHORT_WINDOW: usize = 5;
pub const MA_MEDIUM_WINDOW: usize = 25;
pub const MA_LONG_WINDOW: usize = 75;

/// Roughly six months of daily bars.
pub const TIMING_LOOKBACK_DAYS: i64 = 180;

/// Extra inputs for the timing rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingContext {
    /// P/E the caller wants judged; the rule abstains without it.
    pub entry_pe: Option<f64>,
}

pub fn has_sufficient_history(closes: &[f64]) -> bool {
    closes.len() >= MIN_TIMING_HISTORY
}

/// Fill RSI, moving averages and the current price from a chronological
/// close series. The price is the last close so it is comparable with the
/// averages.
pub fn with_history_indicators(builder: IndicatorSetBuilder, closes: &[f64]) -> IndicatorSetBuilder {
    builder
        .rsi(rsi(closes, RSI_PERIOD))
        .ma_short(sma_last(closes, MA_SHORT_WINDOW))
        .ma_medium(sma_last(closes, MA_MEDIUM_WINDOW))
        .ma_long(sma_last(closes, MA_LONG_WINDOW))
        .current_price(closes.last().copied())
}

/// Indicator set for the timing rules, built from price history alone.
pub fn indicators_from_history(closes: &[f64]) -> IndicatorSet {
    with_history_indicators(IndicatorSet::builder(), closes).build()
}

pub fn rsi_rule(ind: &IndicatorSet, _ctx: &TimingContext) -> Option<Signal> {
    let value = ind.rsi()?;
    let detail = format!("RSI {:.1}", value);
    let (weight, severity, message) = match value {
        v if v < 30.0 => (4, Severity::High, "RSI oversold"),
        v if v < 40.0 => (3, Severity::Medium, "RSI near oversold"),
        v if v < 50.0 => (2, Severity::Medium, "RSI below midline"),
        v if v < 60.0 => (1, Severity::Low, "RSI slightly above midline"),
        v if v < 70.0 => (0, Severity::Low, "RSI neutral"),
        _ => (-2, Severity::Medium, "RSI overbought"),
    };
    Some(Signal::new(SignalCategory::Momentum, severity, weight, message, detail))
}

pub fn moving_average_rule(ind: &IndicatorSet, _ctx: &TimingContext) -> Option<Signal> {
    let price = ind.current_price()?;
    let ma25 = ind.ma_medium()?;

    if price < ma25 {
        return Some(Signal::new(
            SignalCategory::MovingAverage,
            Severity::Medium,
            2,
            "Price below 25-day average",
            format!("price {:.2} < MA25 {:.2}", price, ma25),
        ));
    }
    if let Some(ma5) = ind.ma_short() {
        if price < ma5 {
            return Some(Signal::new(
                SignalCategory::MovingAverage,
                Severity::Low,
                1,
                "Price dipped below 5-day average",
                format!("price {:.2} < MA5 {:.2}", price, ma5),
            ));
        }
    }
    if price > ma25 * 1.1 {
        return Some(Signal::new(
            SignalCategory::MovingAverage,
            Severity::Medium,
            -1,
            "Price stretched above 25-day average",
            format!("price {:.2} > MA25 {:.2} + 10%", price, ma25),
        ));
    }
    Some(Signal::new(
        SignalCategory::MovingAverage,
        Severity::Low,
        0,
        "Price near its averages",
        format!("price {:.2}, MA25 {:.2}", price, ma25),
    ))
}

pub fn trend_rule(ind: &IndicatorSet, _ctx: &TimingContext) -> Option<Signal> {
    let ma5 = ind.ma_short()?;
    let ma25 = ind.ma_medium()?;
    let ma75 = ind.ma_long()?;
    let detail = format!("MA5 {:.2} / MA25 {:.2} / MA75 {:.2}", ma5, ma25, ma75);

    if ma5 > ma25 && ma25 > ma75 {
        Some(Signal::new(SignalCategory::Trend, Severity::Low, 1, "Uptrend", detail))
    } else if ma5 < ma25 && ma25 < ma75 {
        Some(Signal::new(
            SignalCategory::Trend,
            Severity::Medium,
            2,
            "Downtrend, contrarian entry",
            detail,
        ))
    } else {
        Some(Signal::new(SignalCategory::Trend, Severity::Low, 0, "No clear trend", detail))
    }
}

pub fn entry_pe_rule(_ind: &IndicatorSet, ctx: &TimingContext) -> Option<Signal> {
    let pe = ctx.entry_pe.filter(|v| v.is_finite() && *v > 0.0)?;
    let detail = format!("P/E {:.1}", pe);
    let (weight, severity, message) = match pe {
        v if v < 5.0 => (3, Severity::High, "Deeply undervalued P/E"),
        v if v < 7.0 => (2, Severity::Medium, "Undervalued P/E"),
        v if v < 10.0 => (1, Severity::Low, "Reasonable P/E"),
        _ => (0, Severity::Low, "P/E offers no discount"),
    };
    Some(Signal::new(SignalCategory::Valuation, severity, weight, message, detail))
}

type TimingRule = fn(&IndicatorSet, &TimingContext) -> Option<Signal>;

/// Rule order is the order signals appear in the result.
pub const TIMING_RULES: [TimingRule; 4] = [rsi_rule, moving_average_rule, trend_rule, entry_pe_rule];

/// Score buy timing from an already assembled indicator set.
pub fn evaluate_timing(ticker: &str, indicators: IndicatorSet, ctx: &TimingContext) -> EvaluationResult {
    let mut card = Scorecard::new();
    for rule in TIMING_RULES {
        card.push(rule(&indicators, ctx));
    }
    card.into_timing_result(ticker, indicators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Tier, TimingTier};

    fn ctx() -> TimingContext {
        TimingContext::default()
    }

    #[test]
    fn test_rsi_buckets() {
        let cases = [
            (25.0, 4),
            (30.0, 3),
            (39.9, 3),
            (45.0, 2),
            (55.0, 1),
            (65.0, 0),
            (70.0, -2),
            (85.0, -2),
        ];
        for (value, weight) in cases {
            let ind = IndicatorSet::builder().rsi(Some(value)).build();
            let signal = rsi_rule(&ind, &ctx()).unwrap();
            assert_eq!(signal.weight, weight, "rsi {}", value);
        }
    }

    #[test]
    fn test_rsi_25_is_oversold() {
        let ind = IndicatorSet::builder().rsi(Some(25.0)).build();
        let signal = rsi_rule(&ind, &ctx()).unwrap();
        assert_eq!(signal.weight, 4);
        assert_eq!(signal.category, SignalCategory::Momentum);
        assert_eq!(signal.message, "RSI oversold");
    }

    #[test]
    fn test_moving_average_branches() {
        let below = IndicatorSet::builder()
            .current_price(Some(95.0))
            .ma_short(Some(90.0))
            .ma_medium(Some(100.0))
            .build();
        assert_eq!(moving_average_rule(&below, &ctx()).unwrap().weight, 2);

        let dip = IndicatorSet::builder()
            .current_price(Some(104.0))
            .ma_short(Some(106.0))
            .ma_medium(Some(100.0))
            .build();
        assert_eq!(moving_average_rule(&dip, &ctx()).unwrap().weight, 1);

        let stretched = IndicatorSet::builder()
            .current_price(Some(115.0))
            .ma_short(Some(112.0))
            .ma_medium(Some(100.0))
            .build();
        assert_eq!(moving_average_rule(&stretched, &ctx()).unwrap().weight, -1);

        let neutral = IndicatorSet::builder()
            .current_price(Some(105.0))
            .ma_short(Some(104.0))
            .ma_medium(Some(100.0))
            .build();
        assert_eq!(moving_average_rule(&neutral, &ctx()).unwrap().weight, 0);

        let missing = IndicatorSet::builder().current_price(Some(105.0)).build();
        assert!(moving_average_rule(&missing, &ctx()).is_none());
    }

    #[test]
    fn test_downtrend_is_contrarian_buy() {
        let ind = IndicatorSet::builder()
            .ma_short(Some(90.0))
            .ma_medium(Some(100.0))
            .ma_long(Some(120.0))
            .build();
        let signal = trend_rule(&ind, &ctx()).unwrap();
        assert_eq!(signal.weight, 2);
        assert_eq!(signal.category, SignalCategory::Trend);
    }

    #[test]
    fn test_trend_needs_long_average() {
        let ind = IndicatorSet::builder()
            .ma_short(Some(90.0))
            .ma_medium(Some(100.0))
            .build();
        assert!(trend_rule(&ind, &ctx()).is_none());

        let up = IndicatorSet::builder()
            .ma_short(Some(130.0))
            .ma_medium(Some(120.0))
            .ma_long(Some(100.0))
            .build();
        assert_eq!(trend_rule(&up, &ctx()).unwrap().weight, 1);
    }

    #[test]
    fn test_entry_pe_buckets_and_guard() {
        let cases = [(4.0, 3), (6.5, 2), (9.0, 1), (10.0, 0), (25.0, 0)];
        for (pe, weight) in cases {
            let context = TimingContext { entry_pe: Some(pe) };
            let signal = entry_pe_rule(&IndicatorSet::default(), &context).unwrap();
            assert_eq!(signal.weight, weight, "pe {}", pe);
        }

        let negative = TimingContext { entry_pe: Some(-3.0) };
        assert!(entry_pe_rule(&IndicatorSet::default(), &negative).is_none());
        assert!(entry_pe_rule(&IndicatorSet::default(), &ctx()).is_none());
    }

    #[test]
    fn test_entry_pe_ignores_trailing_pe() {
        let ind = IndicatorSet::builder().trailing_pe(Some(4.0)).build();
        assert!(entry_pe_rule(&ind, &ctx()).is_none());

        let explicit = TimingContext { entry_pe: Some(6.0) };
        assert_eq!(entry_pe_rule(&ind, &explicit).unwrap().weight, 2);
    }

    #[test]
    fn test_all_missing_avoids_buying() {
        let result = evaluate_timing("7203.T", IndicatorSet::default(), &ctx());
        assert_eq!(result.score, 0);
        assert_eq!(result.tier, Tier::Timing(TimingTier::AvoidBuying));
        assert!(result.signals.is_empty());
    }

    #[test]
    fn test_strong_buy_is_capped_at_ten() {
        let ind = IndicatorSet::builder()
            .rsi(Some(20.0))
            .current_price(Some(85.0))
            .ma_short(Some(90.0))
            .ma_medium(Some(100.0))
            .ma_long(Some(120.0))
            .build();
        let result = evaluate_timing("7203.T", ind, &TimingContext { entry_pe: Some(4.0) });
        // 4 + 2 + 2 + 3
        assert_eq!(result.score, 10);
        assert_eq!(result.tier, Tier::Timing(TimingTier::StrongBuy));
        assert_eq!(result.signals.len(), 4);
        assert_eq!(result.signals[0].category, SignalCategory::Momentum);
        assert_eq!(result.signals[3].category, SignalCategory::Valuation);
    }

    #[test]
    fn test_overbought_goes_negative() {
        let ind = IndicatorSet::builder()
            .rsi(Some(80.0))
            .current_price(Some(120.0))
            .ma_short(Some(118.0))
            .ma_medium(Some(100.0))
            .build();
        let result = evaluate_timing("7203.T", ind, &ctx());
        assert_eq!(result.score, -3);
        assert_eq!(result.display_score(), 0);
    }

    #[test]
    fn test_history_indicators() {
        let closes: Vec<f64> = (0..80).map(|v| 100.0 + v as f64).collect();
        let ind = indicators_from_history(&closes);
        assert_eq!(ind.rsi(), Some(100.0));
        assert_eq!(ind.ma_short(), Some(177.0));
        assert_eq!(ind.ma_medium(), Some(167.0));
        assert_eq!(ind.ma_long(), Some(142.0));
        assert_eq!(ind.current_price(), Some(179.0));

        let short: Vec<f64> = (0..40).map(|v| 100.0 + v as f64).collect();
        let ind = with_history_indicators(IndicatorSet::builder().current_price(Some(500.0)), &short).build();
        assert_eq!(ind.current_price(), Some(139.0));
        assert_eq!(ind.ma_long(), None);
        assert!(ind.ma_medium().is_some());
        assert!(has_sufficient_history(&short));
        assert!(!has_sufficient_history(&short[..29]));
    }
}
