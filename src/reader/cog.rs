use super::{file_size_mb, gdal_path};
use crate::error::{Error, Result};
use crate::models::geometry::BoundingBox;
use crate::models::raster::GeoTransform;
use crate::traits::BandExtractor;
use async_trait::async_trait;
use gdal::raster::{GdalDataType, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use proj::Proj;
use std::path::{Path, PathBuf};
use tokio::task;

/// Pixel-space rectangle of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub cols: usize,
    pub rows: usize,
}

impl PixelWindow {
    /// All pixels intersecting `bbox`, clamped to the raster.
    ///
    /// `bbox` must already be in the raster's CRS. Rotated geotransforms are
    /// not supported.
    pub fn from_bounds(
        gt: &GeoTransform,
        raster_size: (usize, usize),
        bbox: &BoundingBox,
    ) -> Option<Self> {
        let (width, height) = raster_size;
        let ordered = |a: f64, b: f64| if a <= b { (a, b) } else { (b, a) };

        let (c0, c1) = ordered((bbox.minx - gt[0]) / gt[1], (bbox.maxx - gt[0]) / gt[1]);
        let (r0, r1) = ordered((bbox.maxy - gt[3]) / gt[5], (bbox.miny - gt[3]) / gt[5]);

        let col_start = c0.floor().max(0.0);
        let col_end = c1.ceil().min(width as f64);
        let row_start = r0.floor().max(0.0);
        let row_end = r1.ceil().min(height as f64);

        if !(col_end > col_start && row_end > row_start) {
            return None;
        }

        Some(PixelWindow {
            col_off: col_start as usize,
            row_off: row_start as usize,
            cols: (col_end - col_start) as usize,
            rows: (row_end - row_start) as usize,
        })
    }

    /// Geotransform of the window's top-left pixel.
    pub fn geo_transform(&self, gt: &GeoTransform) -> GeoTransform {
        [
            gt[0] + self.col_off as f64 * gt[1] + self.row_off as f64 * gt[2],
            gt[1],
            gt[2],
            gt[3] + self.col_off as f64 * gt[4] + self.row_off as f64 * gt[5],
            gt[4],
            gt[5],
        ]
    }
}

/// Clips remote (or local) rasters to a WGS84 box and saves them as GeoTIFF.
#[derive(Debug, Default, Clone)]
pub struct GdalBandExtractor;

impl GdalBandExtractor {
    pub fn new() -> Self {
        GdalBandExtractor
    }
}

#[async_trait]
impl BandExtractor for GdalBandExtractor {
    async fn extract(&self, href: &str, bbox: &BoundingBox, output: &Path) -> Result<PathBuf> {
        println!("📥 Downloading band subset...");
        println!("   URL: {}", href);
        println!("   Bounds: {}", bbox);

        let source = gdal_path(href);
        let bbox = *bbox;
        let output = output.to_path_buf();

        let saved = task::spawn_blocking(move || -> Result<PathBuf> {
            clip_dataset(&source, &bbox, &output)?;
            Ok(output)
        })
        .await??;

        println!("✅ Saved: {} ({:.1} MB)", saved.display(), file_size_mb(&saved));
        Ok(saved)
    }
}

/// Window every band of `source` to `bbox` and write the result to `output`.
pub fn clip_dataset(source: &str, bbox: &BoundingBox, output: &Path) -> Result<()> {
    let src = Dataset::open(source)?;
    let gt = src.geo_transform()?;
    let native_bbox = bbox_in_raster_crs(&src, bbox)?;

    let window = PixelWindow::from_bounds(&gt, src.raster_size(), &native_bbox)
        .ok_or_else(|| Error::BBoxOutside(source.to_string()))?;
    log::debug!(
        "clipping {} to {:?} (native bbox {})",
        source,
        window,
        native_bbox
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // Keep the source sample type so crops stay small.
    match src.rasterband(1)?.band_type() {
        GdalDataType::UInt8 => clip_to::<u8>(&src, &gt, &window, output),
        GdalDataType::UInt16 => clip_to::<u16>(&src, &gt, &window, output),
        GdalDataType::Int16 => clip_to::<i16>(&src, &gt, &window, output),
        _ => clip_to::<f32>(&src, &gt, &window, output),
    }
}

fn clip_to<T: GdalType + Copy>(
    src: &Dataset,
    gt: &GeoTransform,
    window: &PixelWindow,
    output: &Path,
) -> Result<()> {
    let bands = src.raster_count();
    let size = (window.cols, window.rows);

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut dst = driver.create_with_band_type::<T, _>(output, window.cols, window.rows, bands)?;
    dst.set_geo_transform(&window.geo_transform(gt))?;
    let projection = src.projection();
    if !projection.is_empty() {
        dst.set_projection(&projection)?;
    }

    for index in 1..=bands {
        let src_band = src.rasterband(index)?;
        let mut buffer = src_band.read_as::<T>(
            (window.col_off as isize, window.row_off as isize),
            size,
            size,
            None,
        )?;
        let mut dst_band = dst.rasterband(index)?;
        dst_band.write((0, 0), size, &mut buffer)?;
        if let Some(nodata) = src_band.no_data_value() {
            dst_band.set_no_data_value(Some(nodata))?;
        }
    }
    dst.flush_cache()?;

    Ok(())
}

/// Reproject the WGS84 box into the dataset's CRS and take the envelope.
///
/// Datasets without any spatial reference are assumed to be geographic.
fn bbox_in_raster_crs(ds: &Dataset, bbox: &BoundingBox) -> Result<BoundingBox> {
    let target = match ds.spatial_ref() {
        Ok(srs) => crs_definition(&srs),
        Err(_) => {
            log::warn!("raster has no spatial reference, using the bounding box as-is");
            return Ok(*bbox);
        }
    };

    match target {
        Some(target) => reproject_bbox(bbox, &target),
        None => Ok(*bbox),
    }
}

/// PROJ definition of `srs`: `AUTHORITY:CODE` when known, WKT otherwise.
/// `None` for EPSG:4326, where no transform is needed.
fn crs_definition(srs: &SpatialRef) -> Option<String> {
    match (srs.auth_name(), srs.auth_code()) {
        (Some(name), Ok(4326)) if name.eq_ignore_ascii_case("EPSG") => None,
        (Some(name), Ok(code)) => Some(format!("{}:{}", name, code)),
        _ => srs.to_wkt().ok().filter(|wkt| !wkt.is_empty()),
    }
}

fn reproject_bbox(bbox: &BoundingBox, target: &str) -> Result<BoundingBox> {
    let to_native = Proj::new_known_crs("EPSG:4326", target, None)
        .map_err(|e| Error::Projection(e.to_string()))?;
    let corners = bbox
        .corners()
        .iter()
        .map(|&c| {
            to_native
                .convert(c)
                .map_err(|e| Error::Projection(e.to_string()))
        })
        .collect::<Result<Vec<(f64, f64)>>>()?;

    BoundingBox::envelope(&corners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_band;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::TempDir;

    const GT: GeoTransform = [10.0, 0.5, 0.0, 20.0, 0.0, -0.5];

    fn bbox(minx: f64, miny: f64, maxx: f64, maxy: f64) -> BoundingBox {
        BoundingBox::new(minx, miny, maxx, maxy).unwrap()
    }

    /// Writes an 8×8 UInt16 GeoTIFF in EPSG:4326 covering lon 10..14, lat 16..20.
    fn generate_band(dir: &TempDir, name: &str, bands: usize, seed: u64) -> PathBuf {
        let path = dir.path().join(name);
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let mut ds = driver
            .create_with_band_type::<u16, _>(&path, 8, 8, bands)
            .unwrap();
        let sref = SpatialRef::from_epsg(4326).unwrap();
        ds.set_projection(&sref.to_wkt().unwrap()).unwrap();
        ds.set_geo_transform(&GT).unwrap();

        let mut rng = StdRng::seed_from_u64(seed);
        for index in 1..=bands {
            let data: Vec<u16> = (0..64).map(|_| rng.random_range(0..10000)).collect();
            let mut band = ds.rasterband(index).unwrap();
            let mut buffer = gdal::raster::Buffer::<u16>::new((8, 8), data);
            band.write((0, 0), (8, 8), &mut buffer).unwrap();
            band.set_no_data_value(Some(0.0)).unwrap();
        }
        ds.flush_cache().unwrap();
        path
    }

    /// 100×100 UInt16 GeoTIFF in UTM 18N at 10 m, centred near `centre`
    /// (lon, lat). Each sample is `row * 100 + col`.
    fn generate_utm_band(dir: &TempDir, name: &str, centre: (f64, f64)) -> (PathBuf, GeoTransform) {
        let to_utm = Proj::new_known_crs("EPSG:4326", "EPSG:32618", None).unwrap();
        let (cx, cy) = to_utm.convert(centre).unwrap();
        let gt = [(cx - 500.0).round(), 10.0, 0.0, (cy + 500.0).round(), 0.0, -10.0];

        let path = dir.path().join(name);
        let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
        let mut ds = driver
            .create_with_band_type::<u16, _>(&path, 100, 100, 1)
            .unwrap();
        let sref = SpatialRef::from_epsg(32618).unwrap();
        ds.set_projection(&sref.to_wkt().unwrap()).unwrap();
        ds.set_geo_transform(&gt).unwrap();

        let data: Vec<u16> = (0..10_000).map(|i| i as u16).collect();
        let mut buffer = gdal::raster::Buffer::<u16>::new((100, 100), data);
        ds.rasterband(1)
            .unwrap()
            .write((0, 0), (100, 100), &mut buffer)
            .unwrap();
        ds.flush_cache().unwrap();
        (path, gt)
    }

    #[test]
    fn test_window_inside() {
        let w = PixelWindow::from_bounds(&GT, (8, 8), &bbox(11.0, 17.0, 12.0, 19.0)).unwrap();
        assert_eq!(
            w,
            PixelWindow {
                col_off: 2,
                row_off: 2,
                cols: 2,
                rows: 4
            }
        );
        assert_eq!(w.geo_transform(&GT), [11.0, 0.5, 0.0, 19.0, 0.0, -0.5]);
    }

    #[test]
    fn test_window_partial_pixels_are_included() {
        let w = PixelWindow::from_bounds(&GT, (8, 8), &bbox(10.6, 18.6, 11.2, 19.4)).unwrap();
        assert_eq!((w.col_off, w.cols), (1, 2));
        assert_eq!((w.row_off, w.rows), (1, 2));
    }

    #[test]
    fn test_window_clamped_to_raster() {
        let w = PixelWindow::from_bounds(&GT, (8, 8), &bbox(13.0, 15.0, 20.0, 17.0)).unwrap();
        assert_eq!(
            w,
            PixelWindow {
                col_off: 6,
                row_off: 6,
                cols: 2,
                rows: 2
            }
        );
    }

    #[test]
    fn test_window_outside() {
        assert!(PixelWindow::from_bounds(&GT, (8, 8), &bbox(30.0, 30.0, 31.0, 31.0)).is_none());
        assert!(PixelWindow::from_bounds(&GT, (8, 8), &bbox(0.0, 0.0, 5.0, 5.0)).is_none());
    }

    #[tokio::test]
    async fn test_extract_local_band() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let src = generate_band(&tmp, "B03.tif", 1, 42);
        let out = tmp.path().join("out").join("B03_clip.tif");

        let saved = GdalBandExtractor::new()
            .extract(src.to_str().unwrap(), &bbox(11.0, 17.0, 12.0, 19.0), &out)
            .await
            .expect("extract should succeed");
        assert_eq!(saved, out);

        let full = read_band(&src, 1).unwrap();
        let clip = read_band(&out, 1).unwrap();
        assert_eq!(clip.shape(), (4, 2));
        assert_eq!(clip.geo_transform, [11.0, 0.5, 0.0, 19.0, 0.0, -0.5]);
        assert_eq!(clip.nodata, Some(0.0));
        for row in 0..4 {
            for col in 0..2 {
                assert_eq!(clip.get(row, col), full.get(row + 2, col + 2));
            }
        }
    }

    #[tokio::test]
    async fn test_extract_keeps_all_bands() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let src = generate_band(&tmp, "TCI.tif", 3, 7);
        let out = tmp.path().join("TCI_clip.tif");

        GdalBandExtractor::new()
            .extract(src.to_str().unwrap(), &bbox(10.0, 16.0, 14.0, 20.0), &out)
            .await
            .unwrap();

        assert_eq!(crate::reader::band_count(&out).unwrap(), 3);
        let (clip, full) = (read_band(&out, 3).unwrap(), read_band(&src, 3).unwrap());
        assert_eq!(clip.data, full.data);
        assert_eq!(clip.geo_transform, full.geo_transform);
    }

    #[tokio::test]
    async fn test_extract_outside_fails() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let src = generate_band(&tmp, "B08.tif", 1, 1);
        let out = tmp.path().join("never.tif");

        let err = GdalBandExtractor::new()
            .extract(src.to_str().unwrap(), &bbox(-50.0, -50.0, -49.0, -49.0), &out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BBoxOutside(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_crs_definition() {
        let utm = SpatialRef::from_epsg(32618).unwrap();
        assert_eq!(crs_definition(&utm).as_deref(), Some("EPSG:32618"));

        let wgs84 = SpatialRef::from_epsg(4326).unwrap();
        assert_eq!(crs_definition(&wgs84), None);

        // No authority code: falls back to the WKT, which PROJ reprojects
        // the same way as the EPSG code.
        let bare = SpatialRef::from_proj4("+proj=utm +zone=18 +datum=WGS84 +units=m +no_defs").unwrap();
        let definition = crs_definition(&bare).expect("projected CRS needs a definition");
        let b = bbox(-73.971, 40.779, -73.969, 40.781);
        let by_code = reproject_bbox(&b, "EPSG:32618").unwrap();
        let by_wkt = reproject_bbox(&b, &definition).unwrap();
        for (a, b) in by_code.to_array().iter().zip(by_wkt.to_array()) {
            assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
        // metres, not degrees
        assert!(by_code.minx > 500_000.0 && by_code.miny > 4_000_000.0);
    }

    #[tokio::test]
    async fn test_extract_reprojects_into_utm() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let (src, src_gt) = generate_utm_band(&tmp, "B03_utm.tif", (-73.97, 40.78));
        let out = tmp.path().join("B03_utm_clip.tif");

        // roughly 170 m by 220 m around the centre
        let wgs84 = bbox(-73.971, 40.779, -73.969, 40.781);
        GdalBandExtractor::new()
            .extract(src.to_str().unwrap(), &wgs84, &out)
            .await
            .expect("extract should succeed");

        let clip = read_band(&out, 1).unwrap();
        let (rows, cols) = clip.shape();
        assert!((17..=22).contains(&cols), "cols = {}", cols);
        assert!((22..=27).contains(&rows), "rows = {}", rows);

        let gt = clip.geo_transform;
        assert_eq!((gt[1], gt[5]), (10.0, -10.0));
        let col_off = (gt[0] - src_gt[0]) / 10.0;
        let row_off = (src_gt[3] - gt[3]) / 10.0;
        assert_eq!(col_off.fract(), 0.0);
        assert_eq!(row_off.fract(), 0.0);
        let (col_off, row_off) = (col_off as usize, row_off as usize);

        // window matches the reprojected box and holds the centre pixel
        let native = reproject_bbox(&wgs84, "EPSG:32618").unwrap();
        let expected = PixelWindow::from_bounds(&src_gt, (100, 100), &native).unwrap();
        assert_eq!((expected.col_off, expected.row_off), (col_off, row_off));
        assert_eq!((expected.cols, expected.rows), (cols, rows));
        assert!(col_off <= 50 && 50 < col_off + cols);
        assert!(row_off <= 50 && 50 < row_off + rows);

        assert_eq!(clip.get(0, 0), Some((row_off * 100 + col_off) as f32));
        assert_eq!(
            clip.get(rows - 1, cols - 1),
            Some(((row_off + rows - 1) * 100 + col_off + cols - 1) as f32)
        );
    }

    #[tokio::test]
    async fn test_extract_outside_utm_footprint_fails() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let (src, _) = generate_utm_band(&tmp, "B08_utm.tif", (-73.97, 40.78));
        let out = tmp.path().join("never_utm.tif");

        // ~40 km east of the 1 km footprint
        let err = GdalBandExtractor::new()
            .extract(src.to_str().unwrap(), &bbox(-73.5, 40.75, -73.49, 40.76), &out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BBoxOutside(_)), "got {:?}", err);
        assert!(!out.exists());
    }
}
