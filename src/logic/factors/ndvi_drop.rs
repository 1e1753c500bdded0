use super::Factor;
use crate::logic::calculations::RecentWindow;

/// NDVI lost over the window. A drop of 0.3 scores 1.
pub struct NdviDrop;

const FULL_SCALE: f64 = 0.3;

impl Factor for NdviDrop {
    fn id(&self) -> &'static str {
        "ndvi_drop"
    }

    fn name(&self) -> &'static str {
        "NDVI drop"
    }

    fn magnitude(&self, window: &RecentWindow) -> f64 {
        window.ndvi_drop()
    }

    fn score(&self, window: &RecentWindow) -> f64 {
        (window.ndvi_drop() / FULL_SCALE).clamp(0.0, 1.0)
    }
}
