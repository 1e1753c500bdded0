pub mod engine;
pub mod et_excess;
pub mod ndvi_drop;
pub mod rain_deficit;

pub use engine::FactorEngine;

use super::calculations::RecentWindow;
use crate::models::FactorScore;

/// A contributor to the stress explanation, scored over a recent window.
pub trait Factor: Send + Sync {
    /// Unique identifier for this factor
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Raw magnitude in the factor's unit
    fn magnitude(&self, window: &RecentWindow) -> f64;

    /// Normalized score in [0, 1]
    fn score(&self, window: &RecentWindow) -> f64;

    fn evaluate(&self, window: &RecentWindow) -> FactorScore {
        FactorScore {
            id: self.id().to_string(),
            label: self.name().to_string(),
            magnitude: self.magnitude(window),
            score: self.score(window).clamp(0.0, 1.0),
        }
    }
}
