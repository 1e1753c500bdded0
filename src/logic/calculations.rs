use crate::models::SignalPoint;

/// Days looked back by the explanation.
pub const EXPLANATION_WINDOW_DAYS: usize = 14;
/// Days of rain subtracted from the irrigation amount.
pub const RAIN_LOOKBACK_DAYS: usize = 7;

/// Aggregates over the tail of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentWindow {
    pub days: usize,
    pub ndvi_start: f64,
    pub ndvi_end: f64,
    pub rain_sum: f64,
    pub et_avg: f64,
}

impl RecentWindow {
    /// Aggregate the last `days` points of `series`. `ndvi_end` is the NDVI the
    /// caller is explaining (usually the snapshot), and also stands in for the
    /// start when the window is empty.
    pub fn from_series(series: &[SignalPoint], days: usize, ndvi_end: f64) -> Self {
        let window = tail(series, days);
        Self {
            days: window.len(),
            ndvi_start: window.first().map(|p| p.ndvi).unwrap_or(ndvi_end),
            ndvi_end,
            rain_sum: total_rain(window),
            et_avg: average_et(window),
        }
    }

    /// Positive when NDVI went down.
    pub fn ndvi_drop(&self) -> f64 {
        (self.ndvi_start - self.ndvi_end).max(0.0)
    }

    pub fn ndvi_delta(&self) -> f64 {
        self.ndvi_end - self.ndvi_start
    }
}

/// The last `count` points, or all of them.
pub fn tail(series: &[SignalPoint], count: usize) -> &[SignalPoint] {
    &series[series.len().saturating_sub(count)..]
}

/// Total rainfall in millimetres.
pub fn total_rain(points: &[SignalPoint]) -> f64 {
    points.iter().map(|p| p.rain).filter(|r| *r >= 0.0).sum()
}

/// Mean ET; zero for an empty slice.
pub fn average_et(points: &[SignalPoint]) -> f64 {
    points.iter().map(|p| p.et).sum::<f64>() / points.len().max(1) as f64
}

/// Rain over the last [`RAIN_LOOKBACK_DAYS`] points.
pub fn recent_rain(series: &[SignalPoint]) -> f64 {
    total_rain(tail(series, RAIN_LOOKBACK_DAYS))
}
