use analysis_core::{
    closes, AnalysisError, EvaluationKind, EvaluationResult, MacroDataProvider, MacroSnapshot,
    MarketDataProvider, PositionContext,
};
use fundamental_analysis::{evaluate_sell, indicators_from_quote};
use macro_risk::{assess_danger, DangerAssessment};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use technical_analysis::{
    evaluate_timing, has_sufficient_history, indicators_from_history, TimingContext,
    TIMING_LOOKBACK_DAYS,
};
use tokio::task::JoinSet;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Hand-entered valuation ratios that no provider supplies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroInputs {
    /// Market cap to GDP, percent
    pub buffett_indicator: Option<f64>,
    pub shiller_pe: Option<f64>,
}

/// Entry point that wires providers, indicator calculators and rule sets together.
///
/// Scoring itself is synchronous; only the provider fetches are async and each
/// one is bounded by the configured timeout.
#[derive(Clone)]
pub struct SignalOrchestrator {
    market_data: Option<Arc<dyn MarketDataProvider>>,
    macro_data: Option<Arc<dyn MacroDataProvider>>,
    fetch_timeout: Duration,
    history_lookback_days: i64,
}

#[derive(Default)]
pub struct SignalOrchestratorBuilder {
    market_data: Option<Arc<dyn MarketDataProvider>>,
    macro_data: Option<Arc<dyn MacroDataProvider>>,
    fetch_timeout: Option<Duration>,
    history_lookback_days: Option<i64>,
}

impl SignalOrchestratorBuilder {
    pub fn market_data(mut self, provider: Arc<dyn MarketDataProvider>) -> Self {
        self.market_data = Some(provider);
        self
    }

    pub fn macro_data(mut self, provider: Arc<dyn MacroDataProvider>) -> Self {
        self.macro_data = Some(provider);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn history_lookback_days(mut self, days: i64) -> Self {
        self.history_lookback_days = Some(days);
        self
    }

    pub fn build(self) -> SignalOrchestrator {
        SignalOrchestrator {
            market_data: self.market_data,
            macro_data: self.macro_data,
            fetch_timeout: self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT),
            history_lookback_days: self.history_lookback_days.unwrap_or(TIMING_LOOKBACK_DAYS),
        }
    }
}

impl SignalOrchestrator {
    pub fn builder() -> SignalOrchestratorBuilder {
        SignalOrchestratorBuilder::default()
    }

    fn market_data(&self) -> Result<&Arc<dyn MarketDataProvider>, AnalysisError> {
        self.market_data
            .as_ref()
            .ok_or(AnalysisError::MissingCollaborator("market data provider"))
    }

    fn macro_data(&self) -> Result<&Arc<dyn MacroDataProvider>, AnalysisError> {
        self.macro_data
            .as_ref()
            .ok_or(AnalysisError::MissingCollaborator("macro data provider"))
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, AnalysisError>
    where
        F: Future<Output = Result<T, AnalysisError>>,
    {
        match tokio::time::timeout(self.fetch_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout(self.fetch_timeout)),
        }
    }

    /// Score whether an existing holding should be sold.
    pub async fn evaluate_sell(&self, position: &PositionContext) -> Result<EvaluationResult, AnalysisError> {
        let provider = self.market_data()?;
        tracing::info!("Evaluating sell signals for {}", position.ticker);

        let quote = match self.bounded(provider.fetch_quote(&position.ticker)).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!("Quote for {} unavailable: {}", position.ticker, e);
                return Ok(EvaluationResult::data_unavailable(EvaluationKind::Sell, &position.ticker));
            }
        };

        let indicators = indicators_from_quote(&quote);
        tracing::debug!("{} indicators available for {}", indicators.available_count(), position.ticker);
        let result = evaluate_sell(indicators, position);
        tracing::info!(
            "Sell evaluation for {}: score {} ({}), {} signals",
            position.ticker,
            result.score,
            result.label,
            result.signals.len()
        );
        Ok(result)
    }

    /// Score whether now is a good time to buy `ticker`.
    ///
    /// Only the price history is fetched; `entry_pe` is the sole input for the
    /// valuation rule.
    pub async fn evaluate_timing(&self, ticker: &str, entry_pe: Option<f64>) -> Result<EvaluationResult, AnalysisError> {
        let provider = self.market_data()?;
        tracing::info!("Evaluating buy timing for {} ({} days of history)", ticker, self.history_lookback_days);

        let bars = match self.bounded(provider.fetch_history(ticker, self.history_lookback_days)).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!("Price history for {} unavailable: {}", ticker, e);
                return Ok(EvaluationResult::data_unavailable(EvaluationKind::Timing, ticker));
            }
        };

        let closes = closes(&bars);
        if !has_sufficient_history(&closes) {
            tracing::warn!("Only {} closes for {}, timing needs more history", closes.len(), ticker);
            return Ok(EvaluationResult::insufficient_data(EvaluationKind::Timing, ticker));
        }

        let indicators = indicators_from_history(&closes);
        let result = evaluate_timing(ticker, indicators, &TimingContext { entry_pe });
        tracing::info!(
            "Timing evaluation for {}: score {} ({}), {} signals",
            ticker,
            result.score,
            result.label,
            result.signals.len()
        );
        Ok(result)
    }

    /// Market-wide danger level. Provider readings that cannot be fetched are
    /// treated as missing, so the manual inputs still count.
    pub async fn evaluate_macro(&self, inputs: &MacroInputs) -> Result<DangerAssessment, AnalysisError> {
        let provider = self.macro_data()?;

        let snapshot = match self.bounded(provider.fetch_macro()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Macro readings unavailable, using manual inputs only: {}", e);
                MacroSnapshot::default()
            }
        };

        let assessment = assess_danger(&snapshot.with_manual(inputs.buffett_indicator, inputs.shiller_pe));
        tracing::info!("Danger level {} ({})", assessment.score, assessment.label);
        Ok(assessment)
    }

    /// Sell evaluation for every position, concurrently. Results follow input order.
    pub async fn evaluate_portfolio(&self, positions: &[PositionContext]) -> Result<Vec<EvaluationResult>, AnalysisError> {
        self.market_data()?;
        tracing::info!("Evaluating {} positions", positions.len());

        let mut tasks = JoinSet::new();
        for (index, position) in positions.iter().cloned().enumerate() {
            let orchestrator = self.clone();
            tasks.spawn(async move {
                let result = orchestrator.evaluate_sell(&position).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<EvaluationResult>> = vec![None; positions.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(result))) => slots[index] = Some(result),
                Ok((_, Err(e))) => return Err(e),
                Err(e) => tracing::warn!("Position evaluation task failed: {}", e),
            }
        }

        Ok(slots
            .into_iter()
            .zip(positions)
            .map(|(slot, position)| {
                slot.unwrap_or_else(|| EvaluationResult::data_unavailable(EvaluationKind::Sell, &position.ticker))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Bar, RawQuote, RawValue, SellTier, SignalCategory, Tier, TimingTier};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeMarketData {
        quotes: HashMap<String, RawQuote>,
        closes: HashMap<String, Vec<f64>>,
        delays_ms: HashMap<String, u64>,
    }

    impl FakeMarketData {
        fn with_quote(mut self, ticker: &str, price: f64, pe: f64) -> Self {
            self.quotes.insert(
                ticker.to_string(),
                RawQuote {
                    symbol: ticker.to_string(),
                    current_price: RawValue::Number(price),
                    trailing_pe: RawValue::Number(pe),
                    ..Default::default()
                },
            );
            self
        }

        fn with_closes(mut self, ticker: &str, closes: Vec<f64>) -> Self {
            self.closes.insert(ticker.to_string(), closes);
            self
        }

        fn with_delay(mut self, ticker: &str, ms: u64) -> Self {
            self.delays_ms.insert(ticker.to_string(), ms);
            self
        }

        async fn pause(&self, ticker: &str) {
            if let Some(ms) = self.delays_ms.get(ticker) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FakeMarketData {
        async fn fetch_quote(&self, ticker: &str) -> Result<RawQuote, AnalysisError> {
            self.pause(ticker).await;
            self.quotes
                .get(ticker)
                .cloned()
                .ok_or_else(|| AnalysisError::Provider(format!("unknown ticker {}", ticker)))
        }

        async fn fetch_history(&self, ticker: &str, _lookback_days: i64) -> Result<Vec<Bar>, AnalysisError> {
            self.pause(ticker).await;
            let closes = self
                .closes
                .get(ticker)
                .ok_or_else(|| AnalysisError::Provider(format!("unknown ticker {}", ticker)))?;
            let start = Utc::now() - ChronoDuration::days(closes.len() as i64);
            Ok(closes
                .iter()
                .enumerate()
                .map(|(i, &close)| Bar {
                    timestamp: start + ChronoDuration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1000.0,
                })
                .collect())
        }
    }

    struct FakeMacro(Result<MacroSnapshot, AnalysisError>);

    #[async_trait]
    impl MacroDataProvider for FakeMacro {
        async fn fetch_macro(&self) -> Result<MacroSnapshot, AnalysisError> {
            self.0.clone()
        }
    }

    fn orchestrator(market: FakeMarketData) -> SignalOrchestrator {
        SignalOrchestrator::builder()
            .market_data(Arc::new(market))
            .fetch_timeout(Duration::from_millis(200))
            .build()
    }

    #[tokio::test]
    async fn test_sell_loss_cut() {
        let orch = orchestrator(FakeMarketData::default().with_quote("7203.T", 2000.0, 9.0));
        let position = PositionContext::new("7203.T", 2870.0, 100.0);

        let result = orch.evaluate_sell(&position).await.unwrap();
        assert_eq!(result.score, 3);
        assert_eq!(result.tier, Tier::Sell(SellTier::MinorConcern));
        assert_eq!(result.signals[0].category, SignalCategory::ProfitLoss);
        assert!((result.return_rate.unwrap() + 30.31).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_provider_failure_is_data_unavailable() {
        let orch = orchestrator(FakeMarketData::default());
        let position = PositionContext::new("0000.T", 100.0, 1.0);

        let result = orch.evaluate_sell(&position).await.unwrap();
        assert_eq!(result.tier, Tier::DataUnavailable);
        assert_eq!(result.score, 0);
        assert!(result.signals.is_empty());
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let market = FakeMarketData::default()
            .with_quote("9101.T", 2000.0, 16.0)
            .with_delay("9101.T", 1000);
        let orch = orchestrator(market);

        let result = orch
            .evaluate_sell(&PositionContext::new("9101.T", 2000.0, 100.0))
            .await
            .unwrap();
        assert_eq!(result.tier, Tier::DataUnavailable);
    }

    #[tokio::test]
    async fn test_missing_collaborators_are_errors() {
        let orch = SignalOrchestrator::builder().build();
        let position = PositionContext::new("7203.T", 100.0, 1.0);

        assert!(matches!(
            orch.evaluate_sell(&position).await,
            Err(AnalysisError::MissingCollaborator(_))
        ));
        assert!(matches!(
            orch.evaluate_timing("7203.T", None).await,
            Err(AnalysisError::MissingCollaborator(_))
        ));
        assert!(matches!(
            orch.evaluate_macro(&MacroInputs::default()).await,
            Err(AnalysisError::MissingCollaborator(_))
        ));
        assert!(matches!(
            orch.evaluate_portfolio(&[position]).await,
            Err(AnalysisError::MissingCollaborator(_))
        ));
    }

    #[tokio::test]
    async fn test_timing_needs_thirty_closes() {
        let closes: Vec<f64> = (0..29).map(|i| 100.0 + i as f64).collect();
        let market = FakeMarketData::default()
            .with_quote("7203.T", 128.0, 12.0)
            .with_closes("7203.T", closes);

        let result = orchestrator(market).evaluate_timing("7203.T", None).await.unwrap();
        assert_eq!(result.tier, Tier::InsufficientData);
        assert!(result.signals.is_empty());
    }

    #[tokio::test]
    async fn test_timing_downtrend_buy() {
        // steady decline: RSI 0, price under every average, MA5 < MA25 < MA75
        let closes: Vec<f64> = (0..80).map(|i| 200.0 - i as f64).collect();
        let market = FakeMarketData::default()
            .with_quote("7203.T", 121.0, 6.0)
            .with_closes("7203.T", closes);

        let result = orchestrator(market).evaluate_timing("7203.T", Some(6.0)).await.unwrap();
        // rsi 4 + below MA25 2 + downtrend 2 + P/E 2, capped
        assert_eq!(result.score, 10);
        assert_eq!(result.tier, Tier::Timing(TimingTier::StrongBuy));
        assert_eq!(result.indicators.ma_long(), Some(158.0));
        assert_eq!(result.indicators.current_price(), Some(121.0));
    }

    #[tokio::test]
    async fn test_timing_uses_history_without_quote() {
        let closes: Vec<f64> = (0..80).map(|i| 200.0 - i as f64).collect();
        let market = FakeMarketData::default().with_closes("7203.T", closes);

        let result = orchestrator(market).evaluate_timing("7203.T", None).await.unwrap();
        assert!(result.is_available());
        // rsi 4 + below MA25 2 + downtrend 2
        assert_eq!(result.score, 8);
        assert_eq!(result.signals.len(), 3);
    }

    #[tokio::test]
    async fn test_timing_price_is_last_close() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let market = FakeMarketData::default()
            .with_quote("7203.T", 50.0, 4.0)
            .with_closes("7203.T", closes);

        let result = orchestrator(market).evaluate_timing("7203.T", None).await.unwrap();
        assert_eq!(result.indicators.current_price(), Some(179.0));
        assert_eq!(result.indicators.trailing_pe(), None);
        assert!(result
            .signals
            .iter()
            .all(|s| s.category != SignalCategory::Valuation));
    }

    #[tokio::test]
    async fn test_timing_history_failure_is_data_unavailable() {
        let market = FakeMarketData::default().with_quote("7203.T", 100.0, 8.0);
        let result = orchestrator(market).evaluate_timing("7203.T", Some(4.0)).await.unwrap();
        assert_eq!(result.tier, Tier::DataUnavailable);
    }

    #[tokio::test]
    async fn test_timeout_reports_sub_second_bound() {
        let orch = orchestrator(FakeMarketData::default());
        let err = orch
            .bounded(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<(), AnalysisError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::Timeout(Duration::from_millis(200)));
        assert!(err.to_string().contains("200ms"));
    }

    #[tokio::test]
    async fn test_timing_entry_pe_override() {
        let closes: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
        let market = FakeMarketData::default()
            .with_quote("7203.T", 100.5, 30.0)
            .with_closes("7203.T", closes);
        let orch = orchestrator(market);

        let without = orch.evaluate_timing("7203.T", None).await.unwrap();
        let with = orch.evaluate_timing("7203.T", Some(4.0)).await.unwrap();
        assert_eq!(with.score - without.score, 3);
        assert!(without.signals.iter().all(|s| s.category != SignalCategory::Valuation));
        assert_eq!(with.signals.last().map(|s| s.category), Some(SignalCategory::Valuation));
    }

    #[tokio::test]
    async fn test_macro_combines_provider_and_manual_inputs() {
        let snapshot = MacroSnapshot {
            ten_year_yield: Some(3.5),
            short_yield: Some(4.2),
            volatility_index: Some(35.0),
            ..Default::default()
        };
        let orch = SignalOrchestrator::builder()
            .macro_data(Arc::new(FakeMacro(Ok(snapshot))))
            .build();

        let inputs = MacroInputs {
            buffett_indicator: Some(210.0),
            shiller_pe: Some(36.0),
        };
        let assessment = orch.evaluate_macro(&inputs).await.unwrap();
        assert_eq!(assessment.score, 9);
        assert!(assessment.buying_opportunity);
        assert_eq!(assessment.snapshot.shiller_pe, Some(36.0));
    }

    #[tokio::test]
    async fn test_macro_provider_failure_keeps_manual_inputs() {
        let orch = SignalOrchestrator::builder()
            .macro_data(Arc::new(FakeMacro(Err(AnalysisError::Provider("down".to_string())))))
            .build();

        let inputs = MacroInputs {
            buffett_indicator: Some(190.0),
            shiller_pe: None,
        };
        let assessment = orch.evaluate_macro(&inputs).await.unwrap();
        assert_eq!(assessment.score, 2);
        assert_eq!(assessment.snapshot.volatility_index, None);
    }

    #[tokio::test]
    async fn test_portfolio_keeps_input_order() {
        let market = FakeMarketData::default()
            .with_quote("A.T", 100.0, 10.0)
            .with_quote("B.T", 300.0, 10.0)
            .with_quote("C.T", 50.0, 10.0)
            .with_delay("A.T", 60)
            .with_delay("B.T", 5);
        let positions = vec![
            PositionContext::new("A.T", 100.0, 10.0),
            PositionContext::new("B.T", 100.0, 10.0),
            PositionContext::new("MISSING.T", 100.0, 10.0),
            PositionContext::new("C.T", 100.0, 10.0),
        ];

        let results = orchestrator(market).evaluate_portfolio(&positions).await.unwrap();
        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["A.T", "B.T", "MISSING.T", "C.T"]);

        assert_eq!(results[0].score, 0);
        assert_eq!(results[1].score, 2);
        assert_eq!(results[2].tier, Tier::DataUnavailable);
        assert_eq!(results[3].score, 3);
    }
}
