//! Thin client for the source-control REST API used by the tree and release backends.

use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::server::error::distribution::DistributionError;

const USER_AGENT_VALUE: &str = concat!("scriptgate/", env!("CARGO_PKG_VERSION"));

/// Media type returning a file's raw bytes from the contents endpoint.
pub const ACCEPT_RAW: &str = "application/vnd.github.raw";
/// Media type returning JSON metadata.
pub const ACCEPT_JSON: &str = "application/vnd.github+json";
/// Media type returning a release asset's binary payload.
pub const ACCEPT_OCTET_STREAM: &str = "application/octet-stream";

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(http: reqwest::Client, api_url: Url, token: Option<String>) -> Self {
        Self {
            http,
            api_url,
            token,
        }
    }

    /// Builds `{api_url}/{segments...}`, percent-encoding every segment.
    ///
    /// Segments containing `/` are split so file paths can be passed as one segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, DistributionError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DistributionError::MalformedManifest(format!(
                    "API URL {} cannot carry a path",
                    self.api_url
                ))
            })?
            .pop_if_empty()
            .extend(
                segments
                    .iter()
                    .flat_map(|segment| segment.split('/'))
                    .filter(|segment| !segment.is_empty()),
            );
        Ok(url)
    }

    /// Sends an authenticated GET and rejects non-success statuses.
    pub async fn get(&self, url: Url, accept: &str) -> Result<reqwest::Response, DistributionError> {
        let mut request = self
            .http
            .get(url.clone())
            .header(ACCEPT, accept)
            .header(USER_AGENT, USER_AGENT_VALUE);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| e.without_url())?;
        ensure_success(url, response)
    }
}

/// Plain GET without credentials, for hosts other than the API.
pub async fn get_anonymous(
    http: &reqwest::Client,
    url: Url,
) -> Result<reqwest::Response, DistributionError> {
    let response = http
        .get(url.clone())
        .header(USER_AGENT, USER_AGENT_VALUE)
        .send()
        .await
        .map_err(|e| e.without_url())?;

    ensure_success(url, response)
}

fn ensure_success(
    mut url: Url,
    response: reqwest::Response,
) -> Result<reqwest::Response, DistributionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    url.set_query(None);
    Err(DistributionError::UpstreamStatus {
        url: url.to_string(),
        status,
    })
}
