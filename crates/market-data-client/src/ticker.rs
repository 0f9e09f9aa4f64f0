/// Default exchange suffix for bare Tokyo Stock Exchange codes.
pub const DEFAULT_TICKER_SUFFIX: &str = ".T";

/// Turn user input into a provider symbol.
///
/// Codes that start with a digit (`7203`, `130A`) get `suffix` appended.
/// Symbols that already carry an exchange (`7203.T`), index symbols (`^VIX`)
/// and plain alphabetic tickers (`AAPL`) pass through upper-cased.
pub fn normalize_ticker(ticker: &str, suffix: &str) -> String {
    let symbol = ticker.trim().to_uppercase();
    if symbol.is_empty() || symbol.starts_with('^') || symbol.contains('.') {
        return symbol;
    }

    let is_exchange_code = symbol.chars().next().is_some_and(|c| c.is_ascii_digit())
        && symbol.chars().all(|c| c.is_ascii_alphanumeric());

    if is_exchange_code && !suffix.is_empty() {
        format!("{}{}", symbol, suffix)
    } else {
        symbol
    }
}
