use crate::models::StressBucket;

/// NDVI at which the vegetation term of the score is zero.
pub const NDVI_REFERENCE: f64 = 0.72;
pub const NDVI_WEIGHT: f64 = 140.0;
pub const RAIN_WEIGHT: f64 = 6.0;
pub const ET_REFERENCE: f64 = 4.2;
pub const ET_WEIGHT: f64 = 10.0;

pub const HIGH_THRESHOLD: u8 = 70;
pub const MEDIUM_THRESHOLD: u8 = 40;

/// Maximum stress shift of the rainfall scenario overlay.
pub const SCENARIO_SWING: f64 = 35.0;

/// Heuristic 0-100 water-stress score.
///
/// Lower NDVI, less rain and higher evapotranspiration each push the score up.
/// The rain term saturates at 6 points (x6) once rain is 0 mm, the ET term at
/// 3 points (x10) once ET reaches 7.2.
pub fn compute_stress(ndvi: f64, rain: f64, et: f64) -> u8 {
    let raw = (NDVI_REFERENCE - ndvi) * NDVI_WEIGHT
        + (6.0 - rain / 3.0).clamp(0.0, 6.0) * RAIN_WEIGHT
        + (et - ET_REFERENCE).clamp(0.0, 3.0) * ET_WEIGHT;
    clamp_score(raw)
}

pub fn bucket(score: u8) -> StressBucket {
    if score >= HIGH_THRESHOLD {
        StressBucket::High
    } else if score >= MEDIUM_THRESHOLD {
        StressBucket::Medium
    } else {
        StressBucket::Low
    }
}

/// Scenario overlay: a drier scenario (`rain_factor < 1`) raises the displayed
/// stress, a wetter one lowers it. Stored scores are never touched.
pub fn display_stress(base_stress: u8, rain_factor: f64) -> u8 {
    clamp_score(f64::from(base_stress) + (1.0 - rain_factor) * SCENARIO_SWING)
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

impl StressBucket {
    pub fn from_score(score: u8) -> Self {
        bucket(score)
    }
}
