pub mod gauge;
pub mod input;

pub use gauge::{et_gauge, ndvi_gauge, rain_gauge, stress_gauge, FactorBars};
pub use input::{InputWidget, SelectWidget};
