use crate::error::{Error, Result};
use crate::models::raster::Raster;

/// Nodata sentinel stamped on written NDWI rasters.
///
/// Distinct from the zero-denominator policy: a sample equal to this value
/// is excluded from statistics, while a zero-denominator sample is a valid 0.
pub const NDWI_NODATA: f64 = -9999.0;

/// Normalized Difference Water Index, `(green - nir) / (green + nir)`.
///
/// Pixels whose denominator is exactly zero are set to 0 rather than NaN,
/// so every output sample is finite for finite inputs. The result keeps the
/// green band's grid and georeferencing and carries [`NDWI_NODATA`].
pub fn ndwi(green: &Raster, nir: &Raster) -> Result<Raster> {
    if green.shape() != nir.shape() || green.data.len() != nir.data.len() {
        return Err(Error::ShapeMismatch {
            green: green.shape(),
            nir: nir.shape(),
        });
    }

    let data: Vec<f32> = green
        .data
        .iter()
        .zip(&nir.data)
        .map(|(&g, &n)| normalized_difference(g, n))
        .collect();

    let mut out = green.with_data(data);
    out.nodata = Some(NDWI_NODATA);
    Ok(out)
}

#[inline]
fn normalized_difference(a: f32, b: f32) -> f32 {
    let denominator = a + b;
    if denominator != 0.0 {
        (a - b) / denominator
    } else {
        0.0
    }
}
