//! STAC item search request/response models, limited to what the NDWI run needs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

pub const GREEN_ASSET: &str = "green";
pub const NIR_ASSET: &str = "nir";
pub const VISUAL_ASSET: &str = "visual";

/// Body for `POST /search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub collections: Vec<String>,
    pub bbox: [f64; 4],
    pub datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(collection: &str, bbox: [f64; 4], start: &str, end: &str, limit: u32) -> Self {
        SearchRequest {
            collections: vec![collection.to_string()],
            bbox,
            datetime: format!("{start}/{end}"),
            query: None,
            limit,
        }
    }

    /// Keep scenes with `eo:cloud_cover` strictly below `max`.
    pub fn cloud_cover_below(mut self, max: f64) -> Self {
        self.query = Some(json!({ "eo:cloud_cover": { "lt": max } }));
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemCollection {
    #[serde(default)]
    pub features: Vec<Scene>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    #[serde(default)]
    pub collection: Option<String>,
    pub properties: SceneProperties,
    #[serde(default)]
    pub assets: HashMap<String, Asset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneProperties {
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover", default)]
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Scene {
    pub fn asset_href(&self, key: &str) -> Result<&str> {
        self.assets
            .get(key)
            .map(|a| a.href.as_str())
            .ok_or_else(|| Error::MissingAsset {
                scene: self.id.clone(),
                asset: key.to_string(),
            })
    }

    pub fn datetime(&self) -> &str {
        self.properties.datetime.as_deref().unwrap_or("unknown")
    }

    pub fn cloud_cover_label(&self) -> String {
        self.properties
            .cloud_cover
            .map(|c| format!("{c}"))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "stac_version": "1.0.0",
                "id": "S2B_18TWL_20240612_0_L2A",
                "collection": "sentinel-2-l2a",
                "bbox": [-74.66, 40.55, -73.34, 41.54],
                "properties": {
                    "datetime": "2024-06-12T15:58:21.024000Z",
                    "eo:cloud_cover": 3.21,
                    "proj:epsg": 32618
                },
                "assets": {
                    "green": {
                        "href": "https://sentinel-cogs.s3.us-west-2.amazonaws.com/sentinel-s2-l2a-cogs/18/T/WL/2024/6/S2B_18TWL_20240612_0_L2A/B03.tif",
                        "type": "image/tiff; application=geotiff; profile=cloud-optimized",
                        "title": "Green (band 3) - 10m"
                    },
                    "nir": {
                        "href": "https://sentinel-cogs.s3.us-west-2.amazonaws.com/sentinel-s2-l2a-cogs/18/T/WL/2024/6/S2B_18TWL_20240612_0_L2A/B08.tif",
                        "type": "image/tiff; application=geotiff; profile=cloud-optimized"
                    },
                    "visual": {
                        "href": "https://sentinel-cogs.s3.us-west-2.amazonaws.com/sentinel-s2-l2a-cogs/18/T/WL/2024/6/S2B_18TWL_20240612_0_L2A/TCI.tif"
                    }
                },
                "links": []
            },
            {
                "type": "Feature",
                "id": "S2A_18TWL_20240607_0_L2A",
                "properties": { "datetime": "2024-06-07T15:58:30Z" },
                "assets": {}
            }
        ],
        "links": [{ "rel": "next", "href": "https://earth-search.aws.element84.com/v1/search" }],
        "context": { "returned": 2, "limit": 5 }
    }"#;

    #[test]
    fn test_parse_search_page() {
        let page: ItemCollection = serde_json::from_str(SAMPLE_PAGE).unwrap();
        assert_eq!(page.features.len(), 2);

        let first = &page.features[0];
        assert_eq!(first.id, "S2B_18TWL_20240612_0_L2A");
        assert_eq!(first.datetime(), "2024-06-12T15:58:21.024000Z");
        assert_eq!(first.cloud_cover_label(), "3.21");
        assert!(first.asset_href(GREEN_ASSET).unwrap().ends_with("/B03.tif"));
        assert!(first.asset_href(NIR_ASSET).unwrap().ends_with("/B08.tif"));
        assert!(first.asset_href(VISUAL_ASSET).unwrap().ends_with("/TCI.tif"));

        let second = &page.features[1];
        assert_eq!(second.cloud_cover_label(), "N/A");
        assert!(matches!(
            second.asset_href(GREEN_ASSET),
            Err(Error::MissingAsset { .. })
        ));
    }

    #[test]
    fn test_search_request_body() {
        let body = SearchRequest::new(
            "sentinel-2-l2a",
            [-73.98, 40.77, -73.96, 40.79],
            "2024-05-13",
            "2024-06-12",
            5,
        )
        .cloud_cover_below(20.0);

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["collections"], json!(["sentinel-2-l2a"]));
        assert_eq!(value["datetime"], "2024-05-13/2024-06-12");
        assert_eq!(value["limit"], 5);
        assert_eq!(value["query"]["eo:cloud_cover"]["lt"], 20.0);
        assert_eq!(value["bbox"].as_array().unwrap().len(), 4);
    }
}
