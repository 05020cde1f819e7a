use crate::error::{Error, Result};
use crate::models::geometry::Coordinate;
use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

pub const EARTH_SEARCH_URL: &str = "https://earth-search.aws.element84.com/v1";
pub const SENTINEL2_COLLECTION: &str = "sentinel-2-l2a";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "waterscan",
    version,
    about = "Sentinel-2 NDWI water analysis around a coordinate, no account required"
)]
pub struct Cli {
    /// Directory for band crops, NDWI rasters and plots
    #[arg(long, default_value = "data", env = "WATERSCAN_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Radius around the point to analyse (km)
    #[arg(long, default_value_t = 2.0)]
    pub buffer_km: f64,

    /// Maximum cloud cover percentage (exclusive)
    #[arg(long, default_value_t = 20.0)]
    pub cloud_cover_max: f64,

    /// How many days back to search
    #[arg(long, default_value_t = 30)]
    pub days_back: u32,

    /// Maximum number of scenes to consider
    #[arg(long, default_value_t = 5)]
    pub limit: u32,

    /// STAC API root
    #[arg(long, default_value = EARTH_SEARCH_URL, env = "WATERSCAN_STAC_URL")]
    pub stac_url: String,

    /// STAC collection to search
    #[arg(long, default_value = SENTINEL2_COLLECTION)]
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub buffer_km: f64,
    pub cloud_cover_max: f64,
    pub days_back: u32,
    pub limit: u32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            buffer_km: 2.0,
            cloud_cover_max: 20.0,
            days_back: 30,
            limit: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub key: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub description: String,
}

impl Location {
    pub fn custom(coordinate: Coordinate) -> Self {
        Location {
            key: "custom".to_string(),
            name: format!("Custom Location ({})", coordinate),
            coordinate,
            description: "Coordinates entered at the prompt".to_string(),
        }
    }
}

/// Everything a run needs. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub stac_url: String,
    pub collection: String,
    pub output_dir: PathBuf,
    pub analysis: AnalysisParams,
    pub locations: Vec<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stac_url: EARTH_SEARCH_URL.to_string(),
            collection: SENTINEL2_COLLECTION.to_string(),
            output_dir: PathBuf::from("data"),
            analysis: AnalysisParams::default(),
            locations: default_locations(),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            stac_url: cli.stac_url,
            collection: cli.collection,
            output_dir: cli.output_dir,
            analysis: AnalysisParams {
                buffer_km: cli.buffer_km,
                cloud_cover_max: cli.cloud_cover_max,
                days_back: cli.days_back,
                limit: cli.limit,
            },
            locations: default_locations(),
        }
    }
}

impl Config {
    pub fn location(&self, key: &str) -> Result<&Location> {
        self.locations
            .iter()
            .find(|l| l.key == key)
            .ok_or_else(|| Error::UnknownLocation {
                key: key.to_string(),
                available: self
                    .locations
                    .iter()
                    .map(|l| l.key.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// `(start, end)` as `YYYY-MM-DD`, ending today.
    pub fn date_range(&self) -> (String, String) {
        date_range_ending(Local::now().date_naive(), self.analysis.days_back)
    }
}

pub fn date_range_ending(end: NaiveDate, days_back: u32) -> (String, String) {
    let start = end - Duration::days(days_back as i64);
    (
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}

fn location(key: &str, name: &str, lon: f64, lat: f64, description: &str) -> Location {
    Location {
        key: key.to_string(),
        name: name.to_string(),
        coordinate: Coordinate { lon, lat },
        description: description.to_string(),
    }
}

pub fn default_locations() -> Vec<Location> {
    vec![
        location("new_york", "New York City", -73.97, 40.78, "Central Park area"),
        location("san_francisco", "San Francisco Bay", -122.42, 37.77, "San Francisco Bay area"),
        location("london", "London", -0.13, 51.51, "Central London"),
        location("netherlands", "Netherlands", 4.9, 52.4, "Central Netherlands"),
        location("custom", "Custom Location", 0.0, 0.0, "Your custom location"),
    ]
}
