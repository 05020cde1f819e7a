pub mod ndwi;
pub mod statistics;

pub use ndwi::{NDWI_NODATA, ndwi};
pub use statistics::{Statistics, WaterContent};
