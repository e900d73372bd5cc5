/// Last value of the exponential moving average of `values`, seeded with
/// the first observation, or `None` for an empty input.
///
/// `EMA[0] = x[0]`, `EMA[t] = x[t] * a + EMA[t-1] * (1 - a)` with
/// `a = 2 / (period + 1)`, evaluated as `EMA[t-1] + a * (x[t] - EMA[t-1])`
/// so a constant input stays exactly constant. A `period` of 0 is treated as
/// 1 (no smoothing).
pub fn ema_last(values: &[f64], period: usize) -> Option<f64> {
    let alpha = smoothing(period);
    let (&first, rest) = values.split_first()?;
    Some(
        rest.iter()
            .fold(first, |prev, &x| prev + alpha * (x - prev)),
    )
}

fn smoothing(period: usize) -> f64 {
    2.0 / (period.max(1) as f64 + 1.0)
}
