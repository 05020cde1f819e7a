//! STAC item search over HTTP.
//!
//! One `POST /search`, first page only. There is no retry and no client
//! timeout: a stalled catalog stalls the run.

use crate::error::{Error, Result};
use crate::models::scene::{ItemCollection, Scene, SearchRequest};
use crate::traits::CatalogSearch;
use async_trait::async_trait;

pub struct StacCatalog {
    search_url: String,
    client: reqwest::Client,
}

impl StacCatalog {
    /// `root` is the API root, e.g. `https://earth-search.aws.element84.com/v1`.
    pub fn new(root: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("waterscan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(StacCatalog {
            search_url: search_url(root),
            client,
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

pub fn search_url(root: &str) -> String {
    let base = root.trim_end_matches('/');
    if base.ends_with("/search") {
        base.to_string()
    } else {
        format!("{}/search", base)
    }
}

#[async_trait]
impl CatalogSearch for StacCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Scene>> {
        log::debug!(
            "POST {} {}",
            self.search_url,
            serde_json::to_string(request)?
        );

        let resp = self
            .client
            .post(&self.search_url)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::CatalogStatus {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let page: ItemCollection = serde_json::from_str(&body)?;
        log::debug!("catalog returned {} items", page.features.len());
        Ok(page.features)
    }
}
