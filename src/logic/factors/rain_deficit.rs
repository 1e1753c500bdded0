use super::Factor;
use crate::logic::calculations::RecentWindow;

/// Shortfall against 40 mm of rain over the window.
pub struct RainDeficit;

const EXPECTED_RAIN_MM: f64 = 40.0;

impl Factor for RainDeficit {
    fn id(&self) -> &'static str {
        "rain_deficit"
    }

    fn name(&self) -> &'static str {
        "Rainfall deficit"
    }

    fn magnitude(&self, window: &RecentWindow) -> f64 {
        (EXPECTED_RAIN_MM - window.rain_sum).max(0.0)
    }

    fn score(&self, window: &RecentWindow) -> f64 {
        (self.magnitude(window) / EXPECTED_RAIN_MM).clamp(0.0, 1.0)
    }
}
