use serde::{Deserialize, Serialize};

/// Sanitized snapshot of every numeric input one evaluation uses.
///
/// Each field is either a finite number or `None`. Built once through
/// [`IndicatorSetBuilder`] and read-only afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    current_price: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    trailing_pe: Option<f64>,
    price_to_book: Option<f64>,
    roe: Option<f64>,
    dividend_yield: Option<f64>,
    market_cap: Option<f64>,
    equity_ratio: Option<f64>,
    operating_margin: Option<f64>,
    revenue_growth: Option<f64>,
    operating_income_growth: Option<f64>,
    rsi: Option<f64>,
    ma_short: Option<f64>,
    ma_medium: Option<f64>,
    ma_long: Option<f64>,
}

impl IndicatorSet {
    pub fn builder() -> IndicatorSetBuilder {
        IndicatorSetBuilder::default()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    pub fn fifty_two_week_high(&self) -> Option<f64> {
        self.fifty_two_week_high
    }

    pub fn fifty_two_week_low(&self) -> Option<f64> {
        self.fifty_two_week_low
    }

    pub fn trailing_pe(&self) -> Option<f64> {
        self.trailing_pe
    }

    pub fn price_to_book(&self) -> Option<f64> {
        self.price_to_book
    }

    /// Return on equity, percent.
    pub fn roe(&self) -> Option<f64> {
        self.roe
    }

    pub fn dividend_yield(&self) -> Option<f64> {
        self.dividend_yield
    }

    pub fn market_cap(&self) -> Option<f64> {
        self.market_cap
    }

    /// Equity / total assets, percent.
    pub fn equity_ratio(&self) -> Option<f64> {
        self.equity_ratio
    }

    pub fn operating_margin(&self) -> Option<f64> {
        self.operating_margin
    }

    pub fn revenue_growth(&self) -> Option<f64> {
        self.revenue_growth
    }

    pub fn operating_income_growth(&self) -> Option<f64> {
        self.operating_income_growth
    }

    pub fn rsi(&self) -> Option<f64> {
        self.rsi
    }

    pub fn ma_short(&self) -> Option<f64> {
        self.ma_short
    }

    pub fn ma_medium(&self) -> Option<f64> {
        self.ma_medium
    }

    pub fn ma_long(&self) -> Option<f64> {
        self.ma_long
    }

    /// Number of indicators that carry a value.
    pub fn available_count(&self) -> usize {
        [
            self.current_price,
            self.fifty_two_week_high,
            self.fifty_two_week_low,
            self.trailing_pe,
            self.price_to_book,
            self.roe,
            self.dividend_yield,
            self.market_cap,
            self.equity_ratio,
            self.operating_margin,
            self.revenue_growth,
            self.operating_income_growth,
            self.rsi,
            self.ma_short,
            self.ma_medium,
            self.ma_long,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

/// Non-finite values handed to the builder are dropped.
fn keep_finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorSetBuilder {
    inner: IndicatorSet,
}

macro_rules! setter {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name(mut self, value: Option<f64>) -> Self {
                self.inner.$name = keep_finite(value);
                self
            }
        )*
    };
}

impl IndicatorSetBuilder {
    setter!(
        current_price,
        fifty_two_week_high,
        fifty_two_week_low,
        trailing_pe,
        price_to_book,
        roe,
        dividend_yield,
        market_cap,
        equity_ratio,
        operating_margin,
        revenue_growth,
        operating_income_growth,
        rsi,
        ma_short,
        ma_medium,
        ma_long,
    );

    pub fn build(self) -> IndicatorSet {
        self.inner
    }
}
