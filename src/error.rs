use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidCoordinate(String),

    #[error("Location '{key}' not found. Available: {available}")]
    UnknownLocation { key: String, available: String },

    #[error("band shapes differ: green is {green:?}, nir is {nir:?} (rows, cols)")]
    ShapeMismatch {
        green: (usize, usize),
        nir: (usize, usize),
    },

    #[error("No valid data found")]
    NoValidData,

    #[error("No Sentinel-2 data found for the specified criteria")]
    NoScenes,

    #[error("scene '{scene}' has no '{asset}' asset")]
    MissingAsset { scene: String, asset: String },

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("bounding box does not intersect the raster extent of {0}")]
    BBoxOutside(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("STAC search returned HTTP {status}: {body}")]
    CatalogStatus { status: u16, body: String },

    #[error("invalid STAC response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("projection error: {0}")]
    Projection(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("plot rendering failed: {0}")]
    Render(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
