/// Default RSI lookback
pub const RSI_PERIOD: usize = 14;

/// Simple Moving Average series; one value per full window.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Mean of the last `period` values, or `None` when the series is shorter than the window.
pub fn sma_last(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    let window = &data[data.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    mean.is_finite().then_some(mean)
}

/// Per-step gains and losses, both non-negative.
fn gains_and_losses(data: &[f64]) -> (Vec<f64>, Vec<f64>) {
    data.windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        // flat window: RS is 0/0
        if avg_gain == 0.0 {
            return None;
        }
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Relative Strength Index over the latest `period` changes.
///
/// Averages are plain rolling means, not Wilder smoothing. Needs `period + 1`
/// observations.
pub fn rsi(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period + 1 {
        return None;
    }

    let (gains, losses) = gains_and_losses(&data[data.len() - period - 1..]);
    let avg_gain = gains.iter().sum::<f64>() / period as f64;
    let avg_loss = losses.iter().sum::<f64>() / period as f64;

    rsi_from_averages(avg_gain, avg_loss)
}

/// Rolling RSI series, one entry per window; undefined windows are `None`.
pub fn rsi_series(data: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let (gains, losses) = gains_and_losses(data);
    let mut values = Vec::with_capacity(gains.len() + 1 - period);
    for i in period..=gains.len() {
        let avg_gain = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;
        values.push(rsi_from_averages(avg_gain, avg_loss));
    }
    values
}
