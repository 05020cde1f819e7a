use crate::error::Result;
use crate::models::raster::Raster;
use gdal::{Dataset, DriverManager};
use std::path::Path;

pub mod cog;

pub use cog::{GdalBandExtractor, PixelWindow};

/// GDAL dataset name for an asset href: remote objects go through the
/// virtual file systems so only the needed byte ranges are fetched.
pub fn gdal_path(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        format!("/vsicurl/{}", href)
    } else if let Some(rest) = href.strip_prefix("s3://") {
        format!("/vsis3/{}", rest)
    } else {
        href.to_string()
    }
}

/// Read one band (1-based) as f32 with its georeferencing.
pub fn read_band(path: &Path, index: usize) -> Result<Raster> {
    let ds = Dataset::open(path)?;
    let (width, height) = ds.raster_size();
    let band = ds.rasterband(index)?;
    let nodata = band.no_data_value();

    let data = band
        .read_as::<f32>((0, 0), (width, height), (width, height), None)?
        .data()
        .to_vec();

    Ok(Raster {
        data,
        width,
        height,
        geo_transform: ds.geo_transform()?,
        projection: ds.projection(),
        nodata,
    })
}

pub fn band_count(path: &Path) -> Result<usize> {
    Ok(Dataset::open(path)?.raster_count())
}

/// Write a single-band Float32 GeoTIFF.
pub fn write_raster(path: &Path, raster: &Raster) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<f32, _>(path, raster.width, raster.height, 1)?;
    ds.set_geo_transform(&raster.geo_transform)?;
    if !raster.projection.is_empty() {
        ds.set_projection(&raster.projection)?;
    }

    let mut band = ds.rasterband(1)?;
    let mut buffer =
        gdal::raster::Buffer::<f32>::new((raster.width, raster.height), raster.data.clone());
    band.write((0, 0), (raster.width, raster.height), &mut buffer)?;
    if let Some(nodata) = raster.nodata {
        band.set_no_data_value(Some(nodata))?;
    }
    ds.flush_cache()?;

    Ok(())
}

/// Size on disk in MB, for the progress lines.
pub fn file_size_mb(path: &Path) -> f64 {
    std::fs::metadata(path)
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}
