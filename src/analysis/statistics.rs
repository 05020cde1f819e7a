use crate::error::{Error, Result};
use crate::models::raster::Raster;
use serde::Serialize;
use std::fmt;

/// Summary of an NDWI raster over its valid samples.
///
/// A sample is valid when it is finite and not the raster's nodata
/// sentinel. Zero-denominator pixels (stored as 0) are valid and count as
/// land, so they lower the water percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub water_pixels: usize,
    pub total_pixels: usize,
    pub water_percentage: f64,
}

impl Statistics {
    /// Fails with [`Error::NoValidData`] when no sample is valid.
    pub fn compute(raster: &Raster) -> Result<Self> {
        let valid: Vec<f64> = raster
            .data
            .iter()
            .copied()
            .filter(|v| v.is_finite() && !raster.is_nodata(*v))
            .map(f64::from)
            .collect();
        Self::from_samples(&valid)
    }

    pub fn from_samples(valid: &[f64]) -> Result<Self> {
        if valid.is_empty() {
            return Err(Error::NoValidData);
        }

        let n = valid.len() as f64;
        let mean = valid.iter().sum::<f64>() / n;
        let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let water_pixels = valid.iter().filter(|&&v| v > 0.0).count();
        let total_pixels = valid.len();
        let water_percentage = 100.0 * water_pixels as f64 / total_pixels as f64;

        Ok(Statistics {
            count: valid.len(),
            mean,
            std: variance.sqrt(),
            min,
            max,
            water_pixels,
            total_pixels,
            water_percentage,
        })
    }

    pub fn land_pixels(&self) -> usize {
        self.total_pixels - self.water_pixels
    }

    pub fn water_content(&self) -> WaterContent {
        WaterContent::from_percentage(self.water_percentage)
    }
}

/// Coarse reading of the water percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterContent {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl WaterContent {
    pub fn from_percentage(pct: f64) -> Self {
        if pct > 50.0 {
            WaterContent::High
        } else if pct > 20.0 {
            WaterContent::Moderate
        } else if pct > 5.0 {
            WaterContent::Low
        } else {
            WaterContent::VeryLow
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WaterContent::High => "🌊",
            WaterContent::Moderate => "💧",
            WaterContent::Low => "🌿",
            WaterContent::VeryLow => "🏔️",
        }
    }
}

impl fmt::Display for WaterContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WaterContent::High => "High water content detected - likely a water body",
            WaterContent::Moderate => "Moderate water content - mixed water/land area",
            WaterContent::Low => "Low water content - mostly land with some water features",
            WaterContent::VeryLow => "Very low water content - mostly land/urban area",
        };
        f.write_str(text)
    }
}
