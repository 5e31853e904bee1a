//! Repository tree backend.
//!
//! Reads the version descriptor at the repository root, lists the root plus a fixed set of
//! top-level directories recursively through the contents API, then downloads every file as
//! raw text. Directory listings and file downloads are both fanned out with bounded
//! concurrency.

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use url::Url;

use crate::server::{
    error::distribution::DistributionError,
    model::distribution::DistributionFile,
    service::distribution::{
        github::{GitHubClient, ACCEPT_JSON, ACCEPT_RAW},
        parse_version_descriptor,
        policy::DeliveryPolicy,
        DistributionSource,
    },
};

/// Top-level directories walked in addition to loose root files.
const TOP_LEVEL_DIRECTORIES: [&str; 4] = ["server", "client", "utils", "web"];

#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: ContentKind,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum ContentKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

pub struct TreeSource {
    client: GitHubClient,
    owner: String,
    git_ref: String,
    version_file: String,
    policy: DeliveryPolicy,
    concurrency: usize,
}

impl TreeSource {
    pub fn new(
        client: GitHubClient,
        owner: impl Into<String>,
        git_ref: impl Into<String>,
        version_file: impl Into<String>,
        policy: DeliveryPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            git_ref: git_ref.into(),
            version_file: version_file.into(),
            policy,
            concurrency: concurrency.max(1),
        }
    }

    fn contents_url(&self, script_name: &str, path: &str) -> Result<Url, DistributionError> {
        let mut url = self
            .client
            .endpoint(&["repos", &self.owner, script_name, "contents", path])?;
        url.query_pairs_mut().append_pair("ref", &self.git_ref);
        Ok(url)
    }

    async fn list_directory(
        &self,
        script_name: &str,
        directory: String,
    ) -> Result<Vec<ContentItem>, DistributionError> {
        let url = self.contents_url(script_name, &directory)?;
        let body = self.client.get(url, ACCEPT_JSON).await?.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            DistributionError::MalformedManifest(format!(
                "listing of '{}' in {}: {}",
                directory, script_name, e
            ))
        })
    }

    async fn fetch_file(
        &self,
        script_name: &str,
        path: String,
    ) -> Result<DistributionFile, DistributionError> {
        let url = self.contents_url(script_name, &path)?;
        let content = self.client.get(url, ACCEPT_RAW).await?.text().await?;

        Ok(DistributionFile::new(path, content))
    }

    /// Walks the tree level by level and returns every deliverable file path.
    async fn collect_paths(&self, script_name: &str) -> Result<Vec<String>, DistributionError> {
        let mut files = Vec::new();
        let mut pending = vec![String::new()];

        while !pending.is_empty() {
            let listings: Vec<Vec<ContentItem>> = stream::iter(std::mem::take(&mut pending))
                .map(|directory| self.list_directory(script_name, directory))
                .buffer_unordered(self.concurrency)
                .try_collect()
                .await?;

            for item in listings.into_iter().flatten() {
                match item.kind {
                    ContentKind::File => {
                        if self.policy.allows(&item.path) {
                            files.push(item.path);
                        }
                    }
                    ContentKind::Dir => {
                        let top_level = !item.path.contains('/');
                        if top_level && !TOP_LEVEL_DIRECTORIES.contains(&item.name.as_str()) {
                            continue;
                        }
                        if self.policy.allows_directory(&item.path) {
                            pending.push(item.path);
                        }
                    }
                    ContentKind::Other => {}
                }
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl DistributionSource for TreeSource {
    fn name(&self) -> &'static str {
        "tree"
    }

    async fn current_version(&self, script_name: &str) -> Result<String, DistributionError> {
        let url = self.contents_url(script_name, &self.version_file)?;
        let body = self.client.get(url, ACCEPT_RAW).await?.text().await?;

        parse_version_descriptor(script_name, &body)
    }

    /// Lists and downloads the tree at the configured ref; `version` is not re-read.
    async fn fetch_files(
        &self,
        script_name: &str,
        _version: &str,
    ) -> Result<Vec<DistributionFile>, DistributionError> {
        let paths = self.collect_paths(script_name).await?;

        stream::iter(paths)
            .map(|path| self.fetch_file(script_name, path))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }
}
