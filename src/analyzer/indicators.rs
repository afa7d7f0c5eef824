use chrono::{DateTime, Utc};

/// Numeric kernels over plain series. The `Analyzer` wires them to table columns.
pub struct SeriesIndicators;

impl SeriesIndicators {
    /// Trailing simple moving average: `out[j]` is the mean of `values[max(0, j - window)..=j]`.
    /// A window of 0 returns the series unchanged.
    pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
        (0..values.len())
            .map(|j| Self::mean(&values[j.saturating_sub(window)..=j]))
            .collect()
    }

    /// Time-weighted first difference, in units per second. `out[0]` is always 0.
    pub fn diff(values: &[f64], timestamps: &[DateTime<Utc>]) -> Vec<f64> {
        let mut out = vec![0.0; values.len()];
        for j in 1..values.len() {
            let elapsed = Self::elapsed_seconds(timestamps[j - 1], timestamps[j]);
            out[j] = (values[j] - values[j - 1]) / elapsed;
        }
        out
    }

    /// Normalized correlation of the series with its cyclic rotation, per lag.
    ///
    /// For lag `t` in `0..len - 1` both the series and `rotate(series, t)` are
    /// restricted to the suffix starting at `t`. The rotation wraps values from
    /// the tail of the series into the front, so small lags mix in values from
    /// the end of the window. A standard deviation that is zero up to rounding
    /// yields 0 for that lag. The last slot has no lag assigned and stays 0.
    pub fn acf(values: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; values.len()];
        for t in 0..values.len().saturating_sub(1) {
            let rotated = Self::rotate(values, t);
            let x = &values[t..];
            let y = &rotated[t..];

            let x_std = Self::std_dev(x);
            let y_std = Self::std_dev(y);
            if Self::is_flat(x, x_std) || Self::is_flat(y, y_std) {
                continue;
            }

            let xy: Vec<f64> = x.iter().zip(y).map(|(a, b)| a * b).collect();
            out[t] = (Self::mean(&xy) - Self::mean(x) * Self::mean(y)) / (x_std * y_std);
        }
        out
    }

    /// Shifts every element `shift` positions to the right, wrapping the tail to the front.
    pub fn rotate(values: &[f64], shift: usize) -> Vec<f64> {
        let mut rotated = values.to_vec();
        if !rotated.is_empty() {
            rotated.rotate_right(shift % values.len());
        }
        rotated
    }

    /// Rows strictly greater than both neighbours. Endpoints are never extrema.
    pub fn local_maxima(values: &[f64]) -> Vec<usize> {
        Self::local_extrema(values, |center, side| center > side)
    }

    /// Rows strictly less than both neighbours. Endpoints are never extrema.
    pub fn local_minima(values: &[f64]) -> Vec<usize> {
        Self::local_extrema(values, |center, side| center < side)
    }

    /// Copies `values` at `indices`, NaN everywhere else.
    pub fn mark(values: &[f64], indices: &[usize]) -> Vec<f64> {
        let mut marked = vec![f64::NAN; values.len()];
        for &i in indices {
            marked[i] = values[i];
        }
        marked
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Population standard deviation.
    pub fn std_dev(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mean = Self::mean(values);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    /// Whether `std` is within the rounding error of computing it over `values`.
    fn is_flat(values: &[f64], std: f64) -> bool {
        let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        std <= scale * f64::EPSILON * values.len().max(8) as f64
    }

    fn local_extrema(values: &[f64], beats: impl Fn(f64, f64) -> bool) -> Vec<usize> {
        values
            .windows(3)
            .enumerate()
            .filter(|(_, w)| beats(w[1], w[0]) && beats(w[1], w[2]))
            .map(|(i, _)| i + 1)
            .collect()
    }

    fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
        let delta = to - from;
        match delta.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => delta.num_milliseconds() as f64 / 1000.0,
        }
    }
}
