pub mod cyclical;
pub mod ratios;
pub mod rules;

use analysis_core::{sanitize, EvaluationResult, IndicatorSet, IndicatorSetBuilder, PositionContext, RawQuote, Scorecard};

pub use cyclical::*;
pub use ratios::*;
pub use rules::*;

/// Fill the quote-derived fields of an indicator set.
///
/// Statement ratios use the newest period; growth compares it with the one before.
pub fn with_quote_indicators(builder: IndicatorSetBuilder, quote: &RawQuote) -> IndicatorSetBuilder {
    let latest_bs = quote.balance_sheets.first();
    let equity_ratio = latest_bs.and_then(|bs| {
        calculate_equity_ratio(sanitize(&bs.stockholders_equity), sanitize(&bs.total_assets))
    });

    let revenue = |i: usize| quote.income_statements.get(i).and_then(|s| sanitize(&s.total_revenue));
    let operating_income = |i: usize| quote.income_statements.get(i).and_then(|s| sanitize(&s.operating_income));

    builder
        .current_price(sanitize(&quote.current_price))
        .fifty_two_week_high(sanitize(&quote.fifty_two_week_high))
        .fifty_two_week_low(sanitize(&quote.fifty_two_week_low))
        .trailing_pe(sanitize(&quote.trailing_pe))
        .price_to_book(sanitize(&quote.price_to_book))
        .roe(roe_percent(sanitize(&quote.return_on_equity)))
        .dividend_yield(sanitize(&quote.dividend_yield))
        .market_cap(sanitize(&quote.market_cap))
        .equity_ratio(equity_ratio)
        .operating_margin(calculate_operating_margin(operating_income(0), revenue(0)))
        .revenue_growth(calculate_growth_rate(revenue(0), revenue(1)))
        .operating_income_growth(calculate_growth_rate(operating_income(0), operating_income(1)))
}

pub fn indicators_from_quote(quote: &RawQuote) -> IndicatorSet {
    with_quote_indicators(IndicatorSet::builder(), quote).build()
}

/// Score whether an existing holding should be sold.
pub fn evaluate_sell(indicators: IndicatorSet, ctx: &PositionContext) -> EvaluationResult {
    let mut card = Scorecard::new();
    for rule in SELL_RULES {
        card.push(rule(&indicators, ctx));
    }
    let return_rate = calculate_unrealized_return(indicators.current_price(), ctx.entry_price, ctx.shares);
    card.into_sell_result(ctx.ticker.clone(), indicators, return_rate)
}
