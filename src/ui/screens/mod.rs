pub mod add_parcel;
pub mod analysis;
pub mod dashboard;
pub mod filters;
pub mod map;

pub use add_parcel::{NewParcelField, NewParcelScreen};
pub use analysis::AnalysisScreen;
pub use dashboard::DashboardScreen;
pub use filters::{FilterField, FiltersScreen};
pub use map::MapScreen;
