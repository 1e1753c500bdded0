pub mod analysis;
pub mod filter;
pub mod parcel;

pub use analysis::*;
pub use filter::*;
pub use parcel::*;
