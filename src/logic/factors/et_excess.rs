use super::Factor;
use crate::logic::calculations::RecentWindow;

/// Mean ET above 4. An excess of 4 scores 1.
pub struct EtExcess;

const ET_BASELINE: f64 = 4.0;

impl Factor for EtExcess {
    fn id(&self) -> &'static str {
        "et_excess"
    }

    fn name(&self) -> &'static str {
        "ET excess"
    }

    fn magnitude(&self, window: &RecentWindow) -> f64 {
        (window.et_avg - ET_BASELINE).max(0.0)
    }

    fn score(&self, window: &RecentWindow) -> f64 {
        (self.magnitude(window) / ET_BASELINE).clamp(0.0, 1.0)
    }
}
