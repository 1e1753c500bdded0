use super::calculations::{recent_rain, RecentWindow, EXPLANATION_WINDOW_DAYS};
use super::factors::FactorEngine;
use super::generator::round_to;
use super::scoring::{bucket, HIGH_THRESHOLD, MEDIUM_THRESHOLD};
use crate::models::{
    AdviceOrigin, Explanation, IrrigationAdvice, Parcel, SignalPoint, SignalSource, StressBucket,
};

pub const WINDOW_URGENT: &str = "within 24-48h";
pub const WINDOW_SOON: &str = "within 2-4 days";
pub const WINDOW_PLANNED: &str = "in the planned window";

/// Share of the last week's rain credited against the irrigation amount.
const RAIN_CREDIT: f64 = 0.4;
const SCENARIO_MIN: f64 = 0.7;
const SCENARIO_MAX: f64 = 1.3;

/// Local "why this stress level" narrative from the last 14 days.
///
/// `shown_stress` is the score on screen next to the narrative and picks the
/// headline. Placeholder for a real model attribution: the factor scores are
/// fixed heuristics over the window, not learned weights.
pub fn why(parcel: &Parcel, snapshot: &SignalPoint, shown_stress: u8) -> Explanation {
    let window = RecentWindow::from_series(&parcel.series, EXPLANATION_WINDOW_DAYS, snapshot.ndvi);
    let factors = FactorEngine::new().evaluate(&window);

    let level = match bucket(shown_stress) {
        StressBucket::High => "high",
        _ => "this level",
    };
    let ndvi_delta = round_to(window.ndvi_delta(), 3);

    let drivers = factors
        .iter()
        .map(|f| format!("{} {}%", f.label.to_lowercase(), f.percent()))
        .collect::<Vec<_>>()
        .join(", ");

    let summary = format!(
        "Last {} days: NDVI change {:+.3}, rain {:.1} mm, mean ET {:.1}. Relative drivers: {}.",
        window.days, ndvi_delta, window.rain_sum, window.et_avg, drivers
    );

    Explanation {
        headline: format!("Why {} stress?", level),
        summary,
        ndvi_delta,
        rain_sum: window.rain_sum,
        et_avg: window.et_avg,
        window_days: window.days,
        factors,
    }
}

/// Base irrigation amount by vegetation vigour.
fn base_amount(ndvi: f64) -> f64 {
    if ndvi < 0.45 {
        25.0
    } else if ndvi < 0.6 {
        15.0
    } else {
        8.0
    }
}

pub fn window_label(stress: u8) -> &'static str {
    if stress >= HIGH_THRESHOLD {
        WINDOW_URGENT
    } else if stress >= MEDIUM_THRESHOLD {
        WINDOW_SOON
    } else {
        WINDOW_PLANNED
    }
}

/// Irrigation amount in mm for a snapshot NDVI, last week's rain and scenario.
///
/// A drier scenario (factor 0.7) scales the amount by 1.3, a wetter one (1.3)
/// by 0.7; factors outside that range are clamped.
pub fn irrigation_amount(ndvi: f64, rain_7d: f64, rain_factor: f64) -> f64 {
    let after_rain = (base_amount(ndvi) - rain_7d.max(0.0) * RAIN_CREDIT).max(0.0);
    let scenario = 2.0 - rain_factor.clamp(SCENARIO_MIN, SCENARIO_MAX);
    (after_rain * scenario).round()
}

/// Local irrigation advice used when no backend recommendation is available.
pub fn recommend(parcel: &Parcel, snapshot: &SignalPoint, rain_factor: f64) -> IrrigationAdvice {
    let rain_7d = recent_rain(&parcel.series);
    let amount = irrigation_amount(snapshot.ndvi, rain_7d, rain_factor);
    let window = window_label(snapshot.stress);

    let confidence = match parcel.source {
        SignalSource::Manual => {
            "Manual observations were added, so this advice carries higher uncertainty."
        }
        SignalSource::Ndvi => "Based on NDVI only; climate signals are not included.",
        SignalSource::NdviEra5 => "Derived from NDVI and climate signals (demo heuristic).",
    };

    let rationale = format!(
        "NDVI {:.3} with {:.0} mm of rain over the last week. {}",
        snapshot.ndvi, rain_7d, confidence
    );

    IrrigationAdvice::new(window, amount, rationale, AdviceOrigin::Local)
        .with_data_point("NDVI", format!("{:.3}", snapshot.ndvi))
        .with_data_point("Rain 7d", format!("{:.0} mm", rain_7d))
        .with_data_point("Stress", snapshot.stress)
        .with_data_point("Scenario", format!("{:.0}%", rain_factor * 100.0))
}
