use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provenance of a parcel's signals. Drives confidence framing in advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    NdviEra5,
    Ndvi,
    Manual,
}

impl SignalSource {
    pub fn all() -> &'static [SignalSource] {
        &[SignalSource::NdviEra5, SignalSource::Ndvi, SignalSource::Manual]
    }

    /// Wire code as used by the backend and config files.
    pub fn code(&self) -> &'static str {
        match self {
            SignalSource::NdviEra5 => "ndvi_era5",
            SignalSource::Ndvi => "ndvi",
            SignalSource::Manual => "manual",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::NdviEra5 => "NDVI + ERA5",
            SignalSource::Ndvi => "NDVI",
            SignalSource::Manual => "Manual",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "ndviera5" => Some(SignalSource::NdviEra5),
            "ndvi" => Some(SignalSource::Ndvi),
            "manual" => Some(SignalSource::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Grow each side by `ratio` of the current extent.
    pub fn pad(self, ratio: f64) -> Bounds {
        let dx = (self.max_lng - self.min_lng) * ratio;
        let dy = (self.max_lat - self.min_lat) * ratio;
        Bounds {
            min_lng: self.min_lng - dx,
            min_lat: self.min_lat - dy,
            max_lng: self.max_lng + dx,
            max_lat: self.max_lat + dy,
        }
    }
}

/// Polygon made of closed rings. Only used for drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Vec<Coordinate>>,
}

impl Polygon {
    /// Axis-aligned rectangle anchored at its south-west corner.
    pub fn rectangle(lng: f64, lat: f64, width: f64, height: f64) -> Self {
        let ring = vec![
            Coordinate { lng, lat },
            Coordinate {
                lng: lng + width,
                lat,
            },
            Coordinate {
                lng: lng + width,
                lat: lat + height,
            },
            Coordinate {
                lng,
                lat: lat + height,
            },
            Coordinate { lng, lat },
        ];
        Self { rings: vec![ring] }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut coords = self.rings.iter().flatten();
        let first = coords.next()?;
        let init = Bounds {
            min_lng: first.lng,
            min_lat: first.lat,
            max_lng: first.lng,
            max_lat: first.lat,
        };
        Some(coords.fold(init, |b, c| Bounds {
            min_lng: b.min_lng.min(c.lng),
            min_lat: b.min_lat.min(c.lat),
            max_lng: b.max_lng.max(c.lng),
            max_lat: b.max_lat.max(c.lat),
        }))
    }

    pub fn is_closed(&self) -> bool {
        !self.rings.is_empty()
            && self
                .rings
                .iter()
                .all(|r| r.len() >= 4 && r.first() == r.last())
    }
}

/// One day of observations for a parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub ndvi: f64,
    pub rain: f64,
    pub et: f64,
    pub stress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: String,
    pub name: String,
    pub province: String,
    pub district: String,
    pub source: SignalSource,
    pub geometry: Polygon,
    /// Chronological, one point per day.
    pub series: Vec<SignalPoint>,
}

impl Parcel {
    pub fn has_ordered_dates(&self) -> bool {
        self.series.windows(2).all(|w| w[0].date < w[1].date)
    }
}
