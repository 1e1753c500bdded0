pub mod calculations;
pub mod data_sync;
pub mod explain;
pub mod factors;
pub mod generator;
pub mod repository;
pub mod scoring;
pub mod snapshot;

pub use data_sync::{fetch_remote_analysis, DataSyncService, RemoteAnalysis};
pub use repository::ParcelRepository;
pub use snapshot::{snapshot, visible_parcels, visible_rows, ParcelRow};
