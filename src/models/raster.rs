/// GDAL-ordered affine transform: origin x, pixel width, row rotation,
/// origin y, column rotation, pixel height (negative for north-up).
pub type GeoTransform = [f64; 6];

/// A single band of samples in row-major order with enough georeferencing
/// to write it back out.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub geo_transform: GeoTransform,
    /// WKT, empty when unknown.
    pub projection: String,
    pub nodata: Option<f64>,
}

impl Raster {
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Raster {
            data,
            width,
            height,
            geo_transform: [0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            projection: String::new(),
            nodata: None,
        }
    }

    /// Build from nested rows; handy for small literal grids.
    pub fn from_rows(rows: &[&[f32]]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Raster::new(data, width, height)
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.height && col < self.width {
            self.data.get(row * self.width + col).copied()
        } else {
            None
        }
    }

    /// Same grid and georeferencing, new samples.
    pub fn with_data(&self, data: Vec<f32>) -> Self {
        Raster {
            data,
            width: self.width,
            height: self.height,
            geo_transform: self.geo_transform,
            projection: self.projection.clone(),
            nodata: self.nodata,
        }
    }

    pub fn is_nodata(&self, value: f32) -> bool {
        self.nodata.map(|nd| value as f64 == nd).unwrap_or(false)
    }
}
