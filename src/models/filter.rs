use super::parcel::SignalSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressBucket {
    Low,
    Medium,
    High,
}

impl StressBucket {
    pub fn code(&self) -> &'static str {
        match self {
            StressBucket::Low => "low",
            StressBucket::Medium => "medium",
            StressBucket::High => "high",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressBucket::Low => "Low",
            StressBucket::Medium => "Medium",
            StressBucket::High => "High",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            StressBucket::Low => Color::Green,
            StressBucket::Medium => Color::Yellow,
            StressBucket::High => Color::LightRed,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            StressBucket::Low => "●",
            StressBucket::Medium => "▲",
            StressBucket::High => "!",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(StressBucket::Low),
            "medium" | "med" => Some(StressBucket::Medium),
            "high" => Some(StressBucket::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for StressBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const MIN_RAIN_FACTOR: f64 = 0.0;
pub const MAX_RAIN_FACTOR: f64 = 2.0;
pub const RAIN_FACTOR_STEP: f64 = 0.1;

/// Session-scoped filter and scenario state. `None` on a categorical filter means "all".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub province: Option<String>,
    pub source: Option<SignalSource>,
    pub stress_bucket: Option<StressBucket>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub rain_factor: f64,
    pub selected_parcel_id: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            province: None,
            source: None,
            stress_bucket: None,
            from: None,
            to: None,
            rain_factor: 1.0,
            selected_parcel_id: None,
        }
    }
}

impl FilterState {
    pub fn with_rain_factor(mut self, rain_factor: f64) -> Self {
        self.set_rain_factor(rain_factor);
        self
    }

    pub fn set_rain_factor(&mut self, rain_factor: f64) {
        let value = if rain_factor.is_finite() {
            rain_factor
        } else {
            1.0
        };
        // Keep one decimal so repeated steps don't drift.
        self.rain_factor = (value.clamp(MIN_RAIN_FACTOR, MAX_RAIN_FACTOR) * 10.0).round() / 10.0;
    }

    pub fn drier(&mut self) {
        self.set_rain_factor(self.rain_factor - RAIN_FACTOR_STEP);
    }

    pub fn wetter(&mut self) {
        self.set_rain_factor(self.rain_factor + RAIN_FACTOR_STEP);
    }

    pub fn cycle_bucket(&mut self) {
        self.stress_bucket = match self.stress_bucket {
            None => Some(StressBucket::Low),
            Some(StressBucket::Low) => Some(StressBucket::Medium),
            Some(StressBucket::Medium) => Some(StressBucket::High),
            Some(StressBucket::High) => None,
        };
    }

    /// Back to `all` for province, source and stress. Dates and scenario stay.
    pub fn clear_categories(&mut self) {
        self.province = None;
        self.source = None;
        self.stress_bucket = None;
    }

    pub fn reset(&mut self) {
        let selected = self.selected_parcel_id.take();
        *self = Self {
            selected_parcel_id: selected,
            ..Self::default()
        };
    }

    pub fn province_label(&self) -> &str {
        self.province.as_deref().unwrap_or("all")
    }

    pub fn source_label(&self) -> &'static str {
        self.source.map(|s| s.code()).unwrap_or("all")
    }

    pub fn bucket_label(&self) -> &'static str {
        self.stress_bucket.map(|b| b.code()).unwrap_or("all")
    }

    /// Label for the rainfall scenario, e.g. "80% rainfall scenario".
    pub fn scenario_label(&self) -> String {
        format!("{:.0}% rainfall scenario", self.rain_factor * 100.0)
    }
}

/// Parse a categorical filter value where "all" (or empty) means no filter.
pub fn parse_all<T>(value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Option<T>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return Some(None);
    }
    parse(trimmed).map(Some)
}

/// Parse an optional ISO date bound where empty means unbounded.
pub fn parse_date_bound(value: &str) -> Option<Option<NaiveDate>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().map(Some)
}
