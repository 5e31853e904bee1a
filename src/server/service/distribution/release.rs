//! Latest-release backend.
//!
//! The tag of the latest release is the version. Assets are then listed from the release
//! with exactly that tag, so the delivered files always match the version that was
//! compared. Every asset is downloaded as binary and delivered base64-encoded, keyed by
//! asset name.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::{stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use url::Url;

use crate::server::{
    error::distribution::DistributionError,
    model::distribution::DistributionFile,
    service::distribution::{
        github::{GitHubClient, ACCEPT_JSON, ACCEPT_OCTET_STREAM},
        DistributionSource,
    },
};

#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    tag_name: String,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    name: String,
    /// API URL of the asset, served as binary with an octet-stream accept header.
    url: String,
}

pub struct ReleaseSource {
    client: GitHubClient,
    owner: String,
    concurrency: usize,
}

impl ReleaseSource {
    pub fn new(client: GitHubClient, owner: impl Into<String>, concurrency: usize) -> Self {
        Self {
            client,
            owner: owner.into(),
            concurrency: concurrency.max(1),
        }
    }

    async fn latest_release(&self, script_name: &str) -> Result<ReleaseInfo, DistributionError> {
        let url = self
            .client
            .endpoint(&["repos", &self.owner, script_name, "releases", "latest"])?;
        self.read_release(script_name, url).await
    }

    async fn tagged_release(
        &self,
        script_name: &str,
        tag: &str,
    ) -> Result<ReleaseInfo, DistributionError> {
        let mut url = self
            .client
            .endpoint(&["repos", &self.owner, script_name, "releases", "tags"])?;
        url.path_segments_mut()
            .map_err(|_| {
                DistributionError::MalformedManifest(format!("release URL for {}", script_name))
            })?
            .push(tag);
        self.read_release(script_name, url).await
    }

    async fn read_release(
        &self,
        script_name: &str,
        url: Url,
    ) -> Result<ReleaseInfo, DistributionError> {
        let body = self.client.get(url, ACCEPT_JSON).await?.text().await?;

        let release: ReleaseInfo = serde_json::from_str(&body).map_err(|e| {
            DistributionError::MalformedManifest(format!("release of {}: {}", script_name, e))
        })?;

        if release.tag_name.trim().is_empty() {
            return Err(DistributionError::MissingVersion(script_name.to_string()));
        }

        Ok(release)
    }

    async fn download_asset(&self, asset: ReleaseAsset) -> Result<DistributionFile, DistributionError> {
        let url = Url::parse(&asset.url).map_err(|e| {
            DistributionError::MalformedManifest(format!("asset '{}' URL: {}", asset.name, e))
        })?;
        let bytes = self.client.get(url, ACCEPT_OCTET_STREAM).await?.bytes().await?;

        Ok(DistributionFile::new(asset.name, STANDARD.encode(&bytes)))
    }
}

#[async_trait]
impl DistributionSource for ReleaseSource {
    fn name(&self) -> &'static str {
        "release"
    }

    async fn current_version(&self, script_name: &str) -> Result<String, DistributionError> {
        Ok(self.latest_release(script_name).await?.tag_name.trim().to_string())
    }

    async fn fetch_files(
        &self,
        script_name: &str,
        version: &str,
    ) -> Result<Vec<DistributionFile>, DistributionError> {
        let release = self.tagged_release(script_name, version).await?;

        stream::iter(release.assets)
            .map(|asset| self.download_asset(asset))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }
}
