use serde::{Deserialize, Serialize};

/// One normalized contributor to the "why" explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub id: String,
    pub label: String,
    /// Raw magnitude in the factor's own unit (NDVI delta, mm, ET).
    pub magnitude: f64,
    /// Normalized to [0, 1]; doubles as a bar length.
    pub score: f64,
}

impl FactorScore {
    pub fn percent(&self) -> u16 {
        (self.score * 100.0).round() as u16
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub headline: String,
    pub summary: String,
    pub ndvi_delta: f64,
    pub rain_sum: f64,
    pub et_avg: f64,
    pub window_days: usize,
    pub factors: Vec<FactorScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdviceOrigin {
    Local,
    Remote,
}

impl AdviceOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceOrigin::Local => "Local heuristic",
            AdviceOrigin::Remote => "Backend model",
        }
    }
}

impl std::fmt::Display for AdviceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: String,
}

impl DataPoint {
    pub fn new(label: &str, value: impl std::fmt::Display) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Advisory irrigation output. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationAdvice {
    pub window: String,
    pub amount_mm: f64,
    pub rationale: String,
    pub origin: AdviceOrigin,
    pub data_points: Vec<DataPoint>,
}

impl IrrigationAdvice {
    pub fn new(
        window: impl Into<String>,
        amount_mm: f64,
        rationale: impl Into<String>,
        origin: AdviceOrigin,
    ) -> Self {
        Self {
            window: window.into(),
            amount_mm,
            rationale: rationale.into(),
            origin,
            data_points: Vec::new(),
        }
    }

    pub fn with_data_point(mut self, label: &str, value: impl std::fmt::Display) -> Self {
        self.data_points.push(DataPoint::new(label, value));
        self
    }

    pub fn headline(&self) -> String {
        format!("Irrigate about {:.0} mm {}", self.amount_mm, self.window)
    }
}

/// Result of the backend `/predict` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub risk_7d: f64,
    #[serde(default)]
    pub risk_14d: Option<f64>,
    #[serde(default)]
    pub ndvi_7d_pred: Option<f64>,
    #[serde(default)]
    pub top_factors: Vec<String>,
}

impl Prediction {
    /// `risk_7d` as a displayable 0-100 stress score.
    pub fn display_stress(&self) -> u8 {
        if !self.risk_7d.is_finite() {
            return 0;
        }
        self.risk_7d.round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advice_builder_collects_data_points() {
        let advice =
            IrrigationAdvice::new("within 2-4 days", 15.0, "dry spell", AdviceOrigin::Local)
                .with_data_point("NDVI", "0.512")
                .with_data_point("Rain 7d", "4 mm");
        assert_eq!(advice.data_points.len(), 2);
        assert_eq!(advice.data_points[1].label, "Rain 7d");
        assert_eq!(advice.headline(), "Irrigate about 15 mm within 2-4 days");
    }

    #[test]
    fn prediction_display_stress_is_clamped() {
        let mut p = Prediction {
            risk_7d: 78.4,
            risk_14d: None,
            ndvi_7d_pred: None,
            top_factors: vec![],
        };
        assert_eq!(p.display_stress(), 78);
        p.risk_7d = 140.0;
        assert_eq!(p.display_stress(), 100);
        p.risk_7d = -3.0;
        assert_eq!(p.display_stress(), 0);
        p.risk_7d = f64::NAN;
        assert_eq!(p.display_stress(), 0);
    }

    #[test]
    fn prediction_tolerates_missing_optional_fields() {
        let p: Prediction = serde_json::from_str(r#"{"risk_7d": 50}"#).unwrap();
        assert_eq!(p.risk_7d, 50.0);
        assert!(p.top_factors.is_empty());
        assert!(p.ndvi_7d_pred.is_none());
    }

    #[test]
    fn factor_percent_rounds() {
        let f = FactorScore {
            id: "ndvi_drop".into(),
            label: "NDVI drop".into(),
            magnitude: 0.1,
            score: 0.333,
        };
        assert_eq!(f.percent(), 33);
    }
}
