//! Seams to the external collaborators: catalog search, band fetch-and-clip,
//! and rendering. The workflow only talks to these.

use crate::analysis::statistics::Statistics;
use crate::error::Result;
use crate::models::geometry::BoundingBox;
use crate::models::scene::{Scene, SearchRequest};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Ranked candidates, best first. An empty list is not an error here.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Scene>>;
}

#[async_trait]
pub trait BandExtractor: Send + Sync {
    /// Clip the asset at `href` to `bbox` (WGS84) and save it at `output`.
    async fn extract(&self, href: &str, bbox: &BoundingBox, output: &Path) -> Result<PathBuf>;
}

/// What to draw and where.
#[derive(Debug, Clone)]
pub struct PlotRequest {
    pub ndwi: PathBuf,
    pub rgb: Option<PathBuf>,
    pub statistics: Statistics,
    pub output: PathBuf,
}

#[async_trait]
pub trait Presenter: Send + Sync {
    async fn render(&self, request: &PlotRequest) -> Result<PathBuf>;
}
