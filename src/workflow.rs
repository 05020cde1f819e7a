//! One analysis run: search, fetch both bands, compute NDWI and its
//! statistics, then hand everything to the presenter.
//!
//! Every step is awaited in order and the first failure ends the run.
//! Only the true-colour crop is optional.

use crate::analysis::ndwi::ndwi;
use crate::analysis::statistics::Statistics;
use crate::catalog::StacCatalog;
use crate::config::{Config, Location, date_range_ending};
use crate::error::{Error, Result};
use crate::models::geometry::BoundingBox;
use crate::models::scene::{GREEN_ASSET, NIR_ASSET, Scene, SearchRequest, VISUAL_ASSET};
use crate::reader::{GdalBandExtractor, read_band, write_raster};
use crate::render::PlotPresenter;
use crate::traits::{BandExtractor, CatalogSearch, PlotRequest, Presenter};
use crate::utils::paths::{artifact_path, href_stem, timestamp};
use crate::utils::status::spinner;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

/// Half-width of the box sent to the catalog, in degrees.
pub const SEARCH_BUFFER_DEG: f64 = 0.01;

/// Files written by a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifacts {
    pub green: PathBuf,
    pub nir: PathBuf,
    pub ndwi: PathBuf,
    pub rgb: Option<PathBuf>,
    pub plot: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub location: String,
    pub scene: Scene,
    pub date_range: (String, String),
    pub bbox: [f64; 4],
    pub artifacts: Artifacts,
    pub statistics: Statistics,
}

pub struct Workflow {
    config: Arc<Config>,
    catalog: Arc<dyn CatalogSearch>,
    extractor: Arc<dyn BandExtractor>,
    presenter: Arc<dyn Presenter>,
}

impl Workflow {
    pub fn new(
        config: Arc<Config>,
        catalog: Arc<dyn CatalogSearch>,
        extractor: Arc<dyn BandExtractor>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Workflow {
            config,
            catalog,
            extractor,
            presenter,
        }
    }

    /// Earth Search (or whatever `stac_url` points at), GDAL and plotters.
    pub fn with_defaults(config: Arc<Config>) -> Result<Self> {
        let catalog = Arc::new(StacCatalog::new(&config.stac_url)?);
        Ok(Workflow::new(
            config,
            catalog,
            Arc::new(GdalBandExtractor::new()),
            Arc::new(PlotPresenter::new()),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self, location: &Location) -> Result<AnalysisReport> {
        self.run_at(location, Local::now()).await
    }

    /// Run with `now` fixing both the date window and the artifact names.
    pub async fn run_at(&self, location: &Location, now: DateTime<Local>) -> Result<AnalysisReport> {
        let params = &self.config.analysis;
        let stamp = timestamp(now);
        let out_dir = self.config.output_dir.as_path();

        let date_range = date_range_ending(now.date_naive(), params.days_back);
        let search_box = location.coordinate.buffer_degrees(SEARCH_BUFFER_DEG)?;
        let request = SearchRequest::new(
            &self.config.collection,
            search_box.to_array(),
            &date_range.0,
            &date_range.1,
            params.limit,
        )
        .cloud_cover_below(params.cloud_cover_max);

        let pb = spinner("🔍 Searching for Sentinel-2 data...");
        let found = self.catalog.search(&request).await;
        pb.finish_and_clear();

        let mut scenes = found?;
        println!("📡 Found {} Sentinel-2 scenes", scenes.len());
        if scenes.is_empty() {
            return Err(Error::NoScenes);
        }
        // First result as ranked by the catalog, not the least cloudy.
        let scene = scenes.swap_remove(0);
        println!("📅 Using scene from: {}", scene.datetime());
        println!("☁️  Cloud cover: {}%", scene.cloud_cover_label());
        log::debug!("selected scene {}", scene.id);

        let bbox = location.coordinate.buffer_km(params.buffer_km)?;

        println!("\n🟢 Downloading Green band (B03)...");
        let green = self.fetch(&scene, GREEN_ASSET, &bbox, out_dir, &stamp).await?;
        println!("\n🔴 Downloading NIR band (B08)...");
        let nir = self.fetch(&scene, NIR_ASSET, &bbox, out_dir, &stamp).await?;

        println!("\n🧮 Calculating NDWI...");
        let ndwi_path = artifact_path(out_dir, "ndwi", &stamp, "tif");
        let statistics = compute_ndwi(&green, &nir, &ndwi_path).await?;
        println!("✅ NDWI saved to: {}", ndwi_path.display());

        println!("\n🌈 Downloading RGB image for visualization...");
        let rgb_path = artifact_path(out_dir, "rgb", &stamp, "tif");
        let rgb = match scene.asset_href(VISUAL_ASSET) {
            Ok(href) => self.extractor.extract(href, &bbox, &rgb_path).await,
            Err(e) => Err(e),
        };
        let rgb = match rgb {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("true-colour image unavailable, plotting NDWI only: {}", e);
                println!("⚠️  RGB image unavailable, continuing without it");
                None
            }
        };

        println!("\n🎨 Creating visualization...");
        let plot = self
            .presenter
            .render(&PlotRequest {
                ndwi: ndwi_path.clone(),
                rgb: rgb.clone(),
                statistics: statistics.clone(),
                output: artifact_path(
                    out_dir,
                    &format!("ndwi_analysis_{}", location.name),
                    &stamp,
                    "png",
                ),
            })
            .await?;

        Ok(AnalysisReport {
            location: location.name.clone(),
            scene,
            date_range,
            bbox: bbox.to_array(),
            artifacts: Artifacts {
                green,
                nir,
                ndwi: ndwi_path,
                rgb,
                plot,
            },
            statistics,
        })
    }

    async fn fetch(
        &self,
        scene: &Scene,
        asset: &str,
        bbox: &BoundingBox,
        out_dir: &Path,
        stamp: &str,
    ) -> Result<PathBuf> {
        let href = scene.asset_href(asset)?;
        // Asset key first: two assets may share a file stem.
        let name = format!("{}_{}", asset, href_stem(href));
        let output = artifact_path(out_dir, &name, stamp, "tif");
        self.extractor.extract(href, bbox, &output).await
    }
}

/// Read both crops, write the NDWI raster and summarise it.
async fn compute_ndwi(green: &Path, nir: &Path, output: &Path) -> Result<Statistics> {
    let (green, nir, output) = (green.to_path_buf(), nir.to_path_buf(), output.to_path_buf());
    task::spawn_blocking(move || {
        let index = ndwi(&read_band(&green, 1)?, &read_band(&nir, 1)?)?;
        write_raster(&output, &index)?;
        Statistics::compute(&index)
    })
    .await?
}
