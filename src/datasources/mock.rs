use super::{DataSource, SourceKind};
use crate::config::RegionConfig;
use crate::error::Result;
use crate::logic::generator::{generate_series, SeriesParams};
use crate::models::{Parcel, Polygon, SignalSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_PROVINCE: &str = "Konya";
pub const DEFAULT_DISTRICT: &str = "Merkez";

struct DemoParcel {
    id: &'static str,
    name: &'static str,
    province: &'static str,
    district: &'static str,
    source: SignalSource,
    lng: f64,
    lat: f64,
    width: f64,
    height: f64,
    baseline: f64,
    trend: f64,
    volatility: f64,
}

const DEMO_PARCELS: [DemoParcel; 4] = [
    DemoParcel {
        id: "P-1024",
        name: "Cumra / Parcel 12",
        province: "Konya",
        district: "Cumra",
        source: SignalSource::NdviEra5,
        lng: 32.77,
        lat: 37.57,
        width: 0.025,
        height: 0.015,
        baseline: 0.58,
        trend: -0.006,
        volatility: 0.02,
    },
    DemoParcel {
        id: "P-2311",
        name: "Merkez / Parcel 4",
        province: "Karaman",
        district: "Merkez",
        source: SignalSource::Ndvi,
        lng: 33.21,
        lat: 37.18,
        width: 0.02,
        height: 0.012,
        baseline: 0.66,
        trend: -0.002,
        volatility: 0.02,
    },
    DemoParcel {
        id: "P-3407",
        name: "Eskil / Parcel 9",
        province: "Aksaray",
        district: "Eskil",
        source: SignalSource::NdviEra5,
        lng: 33.4,
        lat: 38.4,
        width: 0.03,
        height: 0.018,
        baseline: 0.74,
        trend: 0.001,
        volatility: 0.02,
    },
    DemoParcel {
        id: "P-4150",
        name: "Bor / Parcel 2",
        province: "Nigde",
        district: "Bor",
        source: SignalSource::Manual,
        lng: 34.56,
        lat: 37.89,
        width: 0.015,
        height: 0.01,
        baseline: 0.62,
        trend: -0.004,
        volatility: 0.035,
    },
];

/// User input of the "new parcel" form. Blank fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewParcel {
    pub province: String,
    pub district: String,
}

impl NewParcel {
    pub fn province(&self) -> &str {
        non_blank(&self.province).unwrap_or(DEFAULT_PROVINCE)
    }

    pub fn district(&self) -> &str {
        non_blank(&self.district).unwrap_or(DEFAULT_DISTRICT)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Seeded demo data. Also the fallback when the backend is unreachable.
#[derive(Debug, Clone)]
pub struct MockSource {
    seed: Option<u64>,
    region: RegionConfig,
    today: NaiveDate,
}

impl MockSource {
    pub fn new(seed: Option<u64>, region: RegionConfig) -> Self {
        Self {
            seed,
            region,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Pin the last day of generated series.
    #[cfg(test)]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn region(&self) -> RegionConfig {
        self.region
    }

    /// Seeded when configured, otherwise from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn demo_parcels(&self) -> Vec<Parcel> {
        let mut rng = self.rng();
        DEMO_PARCELS
            .iter()
            .map(|demo| Parcel {
                id: demo.id.to_string(),
                name: demo.name.to_string(),
                province: demo.province.to_string(),
                district: demo.district.to_string(),
                source: demo.source,
                geometry: Polygon::rectangle(demo.lng, demo.lat, demo.width, demo.height),
                series: generate_series(
                    &mut rng,
                    self.today,
                    SeriesParams::new(demo.baseline, demo.trend)
                        .with_volatility(demo.volatility),
                ),
            })
            .collect()
    }
}

#[async_trait]
impl DataSource for MockSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Mock
    }

    async fn load_parcels(&self) -> Result<Vec<Parcel>> {
        Ok(self.demo_parcels())
    }
}

/// Random rectangle inside `region`, sized like a field.
pub fn random_rectangle<R: Rng + ?Sized>(rng: &mut R, region: &RegionConfig) -> Polygon {
    let lat = rng.random_range(region.min_lat..region.max_lat);
    let lng = rng.random_range(region.min_lng..region.max_lng);
    let width = rng.random_range(0.01..0.03);
    let height = rng.random_range(0.006..0.02);
    Polygon::rectangle(lng, lat, width, height)
}

/// Random id of a demo parcel, `P-1000` to `P-9999`.
pub fn parcel_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("P-{}", rng.random_range(1000..=9999))
}

/// A fresh synthetic parcel for the "new parcel" action.
pub fn synth_parcel<R: Rng + ?Sized>(
    input: &NewParcel,
    region: &RegionConfig,
    rng: &mut R,
    today: NaiveDate,
) -> Parcel {
    let id = parcel_id(rng);
    let geometry = random_rectangle(rng, region);
    let params = SeriesParams::new(
        rng.random_range(0.56..0.70),
        rng.random_range(-0.004..-0.001),
    );

    Parcel {
        id,
        name: format!("{} / Parcel (new)", input.district()),
        province: input.province().to_string(),
        district: input.district().to_string(),
        source: SignalSource::NdviEra5,
        geometry,
        series: generate_series(rng, today, params),
    }
}
