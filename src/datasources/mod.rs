pub mod backend;
pub mod mock;
pub mod remote;

pub use backend::BackendClient;
pub use mock::{MockSource, NewParcel};
pub use remote::RemoteSource;

use crate::error::Result;
use crate::models::Parcel;
use async_trait::async_trait;
use serde::Serialize;

/// Where the parcel repository was populated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Mock,
    Remote,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Mock => "Demo data",
            SourceKind::Remote => "Backend",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A provider of the session's parcels.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn load_parcels(&self) -> Result<Vec<Parcel>>;
}
