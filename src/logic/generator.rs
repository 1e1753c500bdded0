use super::scoring::compute_stress;
use crate::models::SignalPoint;
use chrono::{Duration, NaiveDate};
use rand::Rng;

/// Length of a synthetic series in days.
pub const SERIES_DAYS: usize = 28;

pub const NDVI_MIN: f64 = 0.05;
pub const NDVI_MAX: f64 = 0.92;
pub const RAIN_MAX: f64 = 30.0;
pub const ET_MAX: f64 = 10.0;

/// Parameters of a synthetic NDVI trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesParams {
    /// NDVI on the first day, before noise.
    pub baseline: f64,
    /// NDVI change per day; negative simulates drying.
    pub trend: f64,
    /// Half-width of the uniform NDVI noise.
    pub volatility: f64,
}

impl SeriesParams {
    pub fn new(baseline: f64, trend: f64) -> Self {
        Self {
            baseline,
            trend,
            volatility: 0.02,
        }
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }
}

/// Generate [`SERIES_DAYS`] daily points ending on `today`.
///
/// Rain is a whole number of millimetres in [0, 18], ET is drawn in [2.5, 6.5]
/// with one decimal. Extreme trends simply saturate NDVI at its bounds.
pub fn generate_series<R: Rng + ?Sized>(
    rng: &mut R,
    today: NaiveDate,
    params: SeriesParams,
) -> Vec<SignalPoint> {
    let volatility = params.volatility.abs();
    let last = SERIES_DAYS as i64 - 1;

    (0..=last)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let rain = rng.random_range(0.0..18.0_f64).round().clamp(0.0, RAIN_MAX);
            let et = round_to(rng.random_range(2.5..6.5_f64), 1).clamp(0.0, ET_MAX);
            let noise = rng.random_range(-volatility..=volatility);
            let elapsed = (last - days_ago) as f64;
            let ndvi = (params.baseline + params.trend * elapsed + noise).clamp(NDVI_MIN, NDVI_MAX);

            SignalPoint {
                date,
                ndvi: round_to(ndvi, 3),
                rain,
                et,
                stress: compute_stress(ndvi, rain, et),
            }
        })
        .collect()
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    #[test]
    fn series_has_28_consecutive_days_ending_today() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = generate_series(&mut rng, today(), SeriesParams::new(0.65, -0.003));

        assert_eq!(series.len(), SERIES_DAYS);
        assert_eq!(series.last().unwrap().date, today());
        assert_eq!(series[0].date, today() - Duration::days(27));
        assert!(series
            .windows(2)
            .all(|w| w[1].date - w[0].date == Duration::days(1)));
    }

    #[test]
    fn values_respect_bounds_and_precision() {
        let mut rng = StdRng::seed_from_u64(11);
        let series = generate_series(&mut rng, today(), SeriesParams::new(0.6, -0.002));

        for p in &series {
            assert!((NDVI_MIN..=NDVI_MAX).contains(&p.ndvi));
            assert!((0.0..=18.0).contains(&p.rain));
            assert_eq!(p.rain.fract(), 0.0);
            assert!((2.5..=6.5).contains(&p.et));
            assert!((p.et * 10.0 - (p.et * 10.0).round()).abs() < 1e-9);
            assert!((p.ndvi * 1000.0 - (p.ndvi * 1000.0).round()).abs() < 1e-9);
            assert!(p.stress <= 100);
        }
    }

    #[test]
    fn zero_volatility_follows_trend_exactly() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = SeriesParams::new(0.7, -0.01).with_volatility(0.0);
        let series = generate_series(&mut rng, today(), params);

        assert_eq!(series[0].ndvi, 0.7);
        assert_eq!(series[27].ndvi, 0.43);
    }

    #[test]
    fn extreme_trend_saturates_instead_of_failing() {
        let mut rng = StdRng::seed_from_u64(5);
        let series = generate_series(&mut rng, today(), SeriesParams::new(0.6, -1.0));
        assert_eq!(series.last().unwrap().ndvi, NDVI_MIN);

        let series = generate_series(&mut rng, today(), SeriesParams::new(0.6, 1.0));
        assert_eq!(series.last().unwrap().ndvi, NDVI_MAX);
    }

    #[test]
    fn same_seed_same_series() {
        let params = SeriesParams::new(0.62, -0.002);
        let a = generate_series(&mut StdRng::seed_from_u64(42), today(), params);
        let b = generate_series(&mut StdRng::seed_from_u64(42), today(), params);
        assert_eq!(a, b);
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(4.26, 1), 4.3);
    }

    proptest! {
        #[test]
        fn dates_strictly_increase(
            seed in any::<u64>(),
            baseline in 0.0f64..1.0,
            trend in -0.05f64..0.05,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let series = generate_series(&mut rng, today(), SeriesParams::new(baseline, trend));
            prop_assert_eq!(series.len(), 28);
            prop_assert!(series.windows(2).all(|w| w[0].date < w[1].date));
            prop_assert_eq!(series.last().unwrap().date, today());
        }
    }
}
