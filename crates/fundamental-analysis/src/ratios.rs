//! Derived financial ratios. Every calculator returns `None` when an input is
//! missing or its denominator is not positive.

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Operating income / revenue, percent.
pub fn calculate_operating_margin(operating_income: Option<f64>, revenue: Option<f64>) -> Option<f64> {
    let (income, revenue) = (operating_income?, revenue?);
    if revenue > 0.0 {
        finite((income / revenue) * 100.0)
    } else {
        None
    }
}

/// Period-over-period change, percent.
pub fn calculate_growth_rate(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    if previous > 0.0 {
        finite(((current - previous) / previous) * 100.0)
    } else {
        None
    }
}

/// Stockholders' equity / total assets, percent.
pub fn calculate_equity_ratio(equity: Option<f64>, total_assets: Option<f64>) -> Option<f64> {
    let (equity, assets) = (equity?, total_assets?);
    if assets > 0.0 {
        finite((equity / assets) * 100.0)
    } else {
        None
    }
}

/// Providers report ROE as a fraction.
pub fn roe_percent(fraction: Option<f64>) -> Option<f64> {
    fraction.and_then(|f| finite(f * 100.0))
}

/// Unrealized profit or loss on the position, percent of the amount invested.
pub fn calculate_unrealized_return(current_price: Option<f64>, entry_price: f64, shares: f64) -> Option<f64> {
    let price = current_price?;
    if entry_price <= 0.0 || shares <= 0.0 {
        return None;
    }
    let invested = entry_price * shares;
    finite(((price * shares - invested) / invested) * 100.0)
}

/// Where the price sits inside its 52-week range, 0 = low, 100 = high.
pub fn calculate_52_week_position(price: Option<f64>, low: Option<f64>, high: Option<f64>) -> Option<f64> {
    let (price, low, high) = (price?, low?, high?);
    if high > low {
        finite(((price - low) / (high - low)) * 100.0)
    } else {
        None
    }
}
