use super::scoring::{bucket, display_stress};
use crate::models::{FilterState, Parcel, SignalPoint, StressBucket};
use chrono::NaiveDate;
use serde::Serialize;

/// Last point within `[from, to]` (inclusive, either side optional).
///
/// An empty window, including `from > to`, falls back to the series' last
/// point. `None` only for an empty series.
pub fn snapshot<'a>(
    parcel: &'a Parcel,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Option<&'a SignalPoint> {
    parcel
        .series
        .iter()
        .rev()
        .find(|p| from.map_or(true, |f| p.date >= f) && to.map_or(true, |t| p.date <= t))
        .or_else(|| parcel.series.last())
}

/// Parcels passing every active filter, in repository order.
pub fn visible_parcels<'a>(parcels: &'a [Parcel], filters: &FilterState) -> Vec<&'a Parcel> {
    parcels
        .iter()
        .filter(|p| matches_filters(p, filters))
        .collect()
}

fn matches_filters(parcel: &Parcel, filters: &FilterState) -> bool {
    if let Some(province) = filters.province.as_deref() {
        if parcel.province != province {
            return false;
        }
    }
    if let Some(source) = filters.source {
        if parcel.source != source {
            return false;
        }
    }
    match filters.stress_bucket {
        None => true,
        Some(wanted) => snapshot(parcel, filters.from, filters.to)
            .map(|snap| bucket(display_stress(snap.stress, filters.rain_factor)) == wanted)
            .unwrap_or(false),
    }
}

/// Distinct provinces, sorted, for the province filter options.
pub fn provinces(parcels: &[Parcel]) -> Vec<String> {
    let mut names: Vec<String> = parcels.iter().map(|p| p.province.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// What the table and map show for one visible parcel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelRow {
    pub id: String,
    pub name: String,
    pub province: String,
    pub source_label: &'static str,
    /// `None` when the parcel has no signal points.
    pub display_stress: Option<u8>,
    pub bucket: Option<StressBucket>,
    pub snapshot_date: Option<NaiveDate>,
    pub ndvi: Option<f64>,
}

impl ParcelRow {
    pub fn build(parcel: &Parcel, filters: &FilterState) -> Self {
        let snap = snapshot(parcel, filters.from, filters.to);
        let shown = snap.map(|s| display_stress(s.stress, filters.rain_factor));
        Self {
            id: parcel.id.clone(),
            name: parcel.name.clone(),
            province: parcel.province.clone(),
            source_label: parcel.source.as_str(),
            display_stress: shown,
            bucket: shown.map(bucket),
            snapshot_date: snap.map(|s| s.date),
            ndvi: snap.map(|s| s.ndvi),
        }
    }

    pub fn stress_text(&self) -> String {
        match (self.bucket, self.display_stress) {
            (Some(b), Some(s)) => format!("{} ({})", b.as_str(), s),
            _ => "No data".to_string(),
        }
    }

    pub fn date_text(&self) -> String {
        self.snapshot_date
            .map(|d| d.format("%d.%m").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

pub fn visible_rows(parcels: &[Parcel], filters: &FilterState) -> Vec<ParcelRow> {
    visible_parcels(parcels, filters)
        .into_iter()
        .map(|p| ParcelRow::build(p, filters))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Polygon, SignalSource};
    use chrono::Duration;
    use proptest::prelude::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap() + Duration::days(n)
    }

    fn parcel(id: &str, province: &str, source: SignalSource, stresses: &[u8]) -> Parcel {
        Parcel {
            id: id.into(),
            name: format!("{} parcel", id),
            province: province.into(),
            district: "Merkez".into(),
            source,
            geometry: Polygon::rectangle(32.5, 37.5, 0.02, 0.01),
            series: stresses
                .iter()
                .enumerate()
                .map(|(i, s)| SignalPoint {
                    date: day(i as i64),
                    ndvi: 0.5,
                    rain: 2.0,
                    et: 4.0,
                    stress: *s,
                })
                .collect(),
        }
    }

    fn demo_set() -> Vec<Parcel> {
        vec![
            parcel("P-1", "Konya", SignalSource::NdviEra5, &[20, 30, 75]),
            parcel("P-2", "Konya", SignalSource::Ndvi, &[50, 45, 40]),
            parcel("P-3", "Karaman", SignalSource::Manual, &[10, 12, 15]),
            parcel("P-4", "Aksaray", SignalSource::NdviEra5, &[60, 62, 65]),
        ]
    }

    fn ids(parcels: &[&Parcel]) -> Vec<String> {
        parcels.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn snapshot_picks_last_point_in_window() {
        let p = parcel("P-1", "Konya", SignalSource::Ndvi, &[10, 20, 30, 40]);
        assert_eq!(snapshot(&p, None, None).unwrap().stress, 40);
        assert_eq!(snapshot(&p, None, Some(day(1))).unwrap().stress, 20);
        assert_eq!(snapshot(&p, Some(day(1)), Some(day(2))).unwrap().stress, 30);
        assert_eq!(snapshot(&p, Some(day(3)), None).unwrap().stress, 40);
    }

    #[test]
    fn snapshot_falls_back_to_last_point() {
        let p = parcel("P-1", "Konya", SignalSource::Ndvi, &[10, 20, 30]);
        // inverted window
        assert_eq!(snapshot(&p, Some(day(2)), Some(day(0))).unwrap().stress, 30);
        // window after the series
        assert_eq!(snapshot(&p, Some(day(10)), None).unwrap().stress, 30);
        // window before the series
        assert_eq!(snapshot(&p, None, Some(day(-5))).unwrap().stress, 30);
    }

    #[test]
    fn snapshot_of_empty_series_is_none() {
        let p = parcel("P-0", "Konya", SignalSource::Ndvi, &[]);
        assert!(snapshot(&p, None, None).is_none());
    }

    #[test]
    fn all_filters_keep_everything_in_order() {
        let parcels = demo_set();
        let visible = visible_parcels(&parcels, &FilterState::default());
        assert_eq!(ids(&visible), ["P-1", "P-2", "P-3", "P-4"]);
    }

    #[test]
    fn high_bucket_keeps_single_high_parcel() {
        let parcels = demo_set();
        let filters = FilterState {
            stress_bucket: Some(StressBucket::High),
            ..FilterState::default()
        };
        assert_eq!(ids(&visible_parcels(&parcels, &filters)), ["P-1"]);
    }

    #[test]
    fn bucket_uses_windowed_snapshot() {
        let parcels = demo_set();
        let filters = FilterState {
            stress_bucket: Some(StressBucket::Low),
            to: Some(day(1)),
            ..FilterState::default()
        };
        // P-1 is low (30) on day 1, P-3 is low throughout
        assert_eq!(ids(&visible_parcels(&parcels, &filters)), ["P-1", "P-3"]);
    }

    #[test]
    fn drier_scenario_moves_parcels_up_a_bucket() {
        let parcels = demo_set();
        let filters = FilterState {
            stress_bucket: Some(StressBucket::High),
            ..FilterState::default()
        }
        .with_rain_factor(0.8);
        // P-4: 65 + 7 = 72
        assert_eq!(ids(&visible_parcels(&parcels, &filters)), ["P-1", "P-4"]);
    }

    #[test]
    fn province_and_source_filters_compose() {
        let parcels = demo_set();
        let filters = FilterState {
            province: Some("Konya".into()),
            source: Some(SignalSource::Ndvi),
            ..FilterState::default()
        };
        assert_eq!(ids(&visible_parcels(&parcels, &filters)), ["P-2"]);
    }

    #[test]
    fn empty_series_only_visible_without_bucket_filter() {
        let parcels = vec![parcel("P-0", "Konya", SignalSource::Ndvi, &[])];
        assert_eq!(visible_parcels(&parcels, &FilterState::default()).len(), 1);

        let filters = FilterState {
            stress_bucket: Some(StressBucket::Low),
            ..FilterState::default()
        };
        assert!(visible_parcels(&parcels, &filters).is_empty());

        let row = ParcelRow::build(&parcels[0], &FilterState::default());
        assert_eq!(row.stress_text(), "No data");
        assert_eq!(row.date_text(), "-");
    }

    #[test]
    fn empty_repository_yields_no_rows() {
        assert!(visible_rows(&[], &FilterState::default()).is_empty());
    }

    #[test]
    fn rows_carry_display_values() {
        let parcels = demo_set();
        let filters = FilterState::default().with_rain_factor(0.0);
        let rows = visible_rows(&parcels, &filters);
        assert_eq!(rows[1].display_stress, Some(75));
        assert_eq!(rows[1].bucket, Some(StressBucket::High));
        assert_eq!(rows[1].stress_text(), "High (75)");
        assert_eq!(rows[2].source_label, "Manual");
        assert_eq!(rows[0].snapshot_date, Some(day(2)));
    }

    #[test]
    fn provinces_are_sorted_and_unique() {
        assert_eq!(provinces(&demo_set()), ["Aksaray", "Karaman", "Konya"]);
    }

    proptest! {
        #[test]
        fn visible_parcels_is_idempotent(bucket_idx in 0usize..4, factor in 0.0f64..2.0) {
            let parcels = demo_set();
            let buckets = [
                None,
                Some(StressBucket::Low),
                Some(StressBucket::Medium),
                Some(StressBucket::High),
            ];
            let filters = FilterState {
                stress_bucket: buckets[bucket_idx],
                ..FilterState::default()
            }
            .with_rain_factor(factor);
            let first = ids(&visible_parcels(&parcels, &filters));
            let second = ids(&visible_parcels(&parcels, &filters));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn snapshot_never_missing_for_non_empty_series(from in -5i64..10, to in -5i64..10) {
            let p = parcel("P-1", "Konya", SignalSource::Ndvi, &[10, 20, 30]);
            prop_assert!(snapshot(&p, Some(day(from)), Some(day(to))).is_some());
        }
    }
}
