use super::{et_excess::EtExcess, ndvi_drop::NdviDrop, rain_deficit::RainDeficit, Factor};
use crate::logic::calculations::RecentWindow;
use crate::models::FactorScore;

pub struct FactorEngine {
    factors: Vec<Box<dyn Factor>>,
}

impl FactorEngine {
    pub fn new() -> Self {
        let factors: Vec<Box<dyn Factor>> =
            vec![Box::new(NdviDrop), Box::new(RainDeficit), Box::new(EtExcess)];

        Self { factors }
    }

    /// Scores in a fixed order: NDVI drop, rainfall deficit, ET excess.
    pub fn evaluate(&self, window: &RecentWindow) -> Vec<FactorScore> {
        self.factors.iter().map(|f| f.evaluate(window)).collect()
    }
}

impl Default for FactorEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(ndvi_start: f64, ndvi_end: f64, rain_sum: f64, et_avg: f64) -> RecentWindow {
        RecentWindow {
            days: 14,
            ndvi_start,
            ndvi_end,
            rain_sum,
            et_avg,
        }
    }

    #[test]
    fn evaluates_in_fixed_order() {
        let engine = FactorEngine::new();
        let scores = engine.evaluate(&window(0.7, 0.55, 10.0, 5.0));
        let ids: Vec<_> = scores.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["ndvi_drop", "rain_deficit", "et_excess"]);

        assert!((scores[0].score - 0.5).abs() < 1e-9);
        assert!((scores[1].score - 0.75).abs() < 1e-9);
        assert!((scores[2].score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn scores_saturate_at_one() {
        let engine = FactorEngine::new();
        let scores = engine.evaluate(&window(0.9, 0.1, 0.0, 10.0));
        assert!(scores.iter().all(|s| s.score == 1.0));
    }

    #[test]
    fn favourable_conditions_score_zero() {
        let engine = FactorEngine::new();
        let scores = engine.evaluate(&window(0.5, 0.6, 80.0, 3.0));
        assert!(scores.iter().all(|s| s.score == 0.0));
    }
}
