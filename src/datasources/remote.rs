use super::backend::BackendClient;
use super::mock::random_rectangle;
use super::{DataSource, SourceKind};
use crate::config::RegionConfig;
use crate::error::Result;
use crate::models::{Parcel, SignalSource};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const UNKNOWN_PROVINCE: &str = "Unknown";
pub const UNKNOWN_DISTRICT: &str = "-";

/// Parcels and series served by the prediction backend.
///
/// The backend has no geometry, so each parcel gets a rectangle placed at
/// random inside the configured region.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: BackendClient,
    region: RegionConfig,
    seed: Option<u64>,
}

impl RemoteSource {
    pub fn new(client: BackendClient, region: RegionConfig, seed: Option<u64>) -> Self {
        Self {
            client,
            region,
            seed,
        }
    }
}

#[async_trait]
impl DataSource for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn load_parcels(&self) -> Result<Vec<Parcel>> {
        let listed = self.client.parcels().await?;
        tracing::info!("Backend listed {} parcels", listed.len());

        let mut fetched = Vec::with_capacity(listed.len());
        for remote in listed {
            let series = self.client.timeseries(&remote.parcel_id).await?;
            tracing::debug!(
                "Loaded {} points for parcel {}",
                series.len(),
                remote.parcel_id
            );
            fetched.push((remote, series));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(fetched
            .into_iter()
            .map(|(remote, series)| Parcel {
                name: if remote.name.trim().is_empty() {
                    remote.parcel_id.clone()
                } else {
                    remote.name
                },
                id: remote.parcel_id,
                province: UNKNOWN_PROVINCE.to_string(),
                district: UNKNOWN_DISTRICT.to_string(),
                source: SignalSource::NdviEra5,
                geometry: random_rectangle(&mut rng, &self.region),
                series,
            })
            .collect())
    }
}
