use super::snapshot;
use crate::datasources::{DataSource, MockSource, SourceKind};
use crate::models::Parcel;

/// The session's parcels, in display order.
#[derive(Debug, Clone)]
pub struct ParcelRepository {
    parcels: Vec<Parcel>,
    origin: SourceKind,
    backend_available: bool,
}

impl ParcelRepository {
    pub fn new(parcels: Vec<Parcel>, origin: SourceKind, backend_available: bool) -> Self {
        Self {
            parcels,
            origin,
            backend_available,
        }
    }

    /// Load from `primary`, falling back to the demo set when it fails or
    /// there is none. A fallback marks the backend unavailable.
    pub async fn load(primary: Option<&dyn DataSource>, fallback: &MockSource) -> Self {
        if let Some(source) = primary {
            match source.load_parcels().await {
                Ok(parcels) => {
                    tracing::info!("Loaded {} parcels from {}", parcels.len(), source.kind());
                    check_parcels(&parcels);
                    let remote = source.kind() == SourceKind::Remote;
                    return Self::new(parcels, source.kind(), remote);
                }
                Err(e) if e.is_remote() => {
                    tracing::warn!("{} unreachable, using demo data: {}", source.kind(), e);
                }
                Err(e) => {
                    tracing::warn!("{} sent unusable data, using demo data: {}", source.kind(), e);
                }
            }
        }

        Self::new(fallback.demo_parcels(), SourceKind::Mock, false)
    }

    /// Prepend a parcel so it shows first.
    pub fn add(&mut self, parcel: Parcel) -> &Parcel {
        tracing::debug!("Adding parcel {}", parcel.id);
        self.parcels.insert(0, parcel);
        &self.parcels[0]
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Parcel> {
        self.parcels.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn provinces(&self) -> Vec<String> {
        snapshot::provinces(&self.parcels)
    }

    pub fn origin(&self) -> SourceKind {
        self.origin
    }

    pub fn backend_available(&self) -> bool {
        self.backend_available
    }
}

/// Log parcels breaking the series or geometry invariants. They are kept.
fn check_parcels(parcels: &[Parcel]) {
    for parcel in parcels {
        if !parcel.has_ordered_dates() {
            tracing::warn!("Parcel {} has unordered or repeated dates", parcel.id);
        }
        if !parcel.geometry.is_closed() {
            tracing::warn!("Parcel {} has an open outline", parcel.id);
        }
        if parcel.series.is_empty() {
            tracing::debug!("Parcel {} has no signal points", parcel.id);
        }
    }
}
