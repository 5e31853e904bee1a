//! Script distribution.
//!
//! A `DistributionSource` knows how to read the current version of a script and how to
//! collect its raw files from one kind of upstream (repository tree, latest release or a
//! fixed archive). `DistributionService` sits in front of the configured source, applies the
//! `DeliveryPolicy` to whatever it returns and enforces the fetch deadline.

pub mod archive;
pub mod github;
pub mod policy;
pub mod release;
pub mod tree;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::server::{
    error::distribution::DistributionError,
    model::distribution::{DistributionFile, DistributionRelease, Manifest},
    service::distribution::policy::DeliveryPolicy,
};

/// One upstream kind serving script releases.
#[async_trait]
pub trait DistributionSource: Send + Sync {
    /// Short label for log lines.
    fn name(&self) -> &'static str;

    /// Reads the version currently published for `script_name`.
    async fn current_version(&self, script_name: &str) -> Result<String, DistributionError>;

    /// Collects every raw file published for `script_name` at `version`.
    ///
    /// `version` is the label previously returned by `current_version`; sources that only
    /// ever serve one release may ignore it.
    async fn fetch_files(
        &self,
        script_name: &str,
        version: &str,
    ) -> Result<Vec<DistributionFile>, DistributionError>;
}

#[derive(Clone)]
pub struct DistributionService {
    source: Arc<dyn DistributionSource>,
    policy: DeliveryPolicy,
    fetch_timeout: Duration,
}

impl DistributionService {
    pub fn new(
        source: Arc<dyn DistributionSource>,
        policy: DeliveryPolicy,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            policy,
            fetch_timeout,
        }
    }

    /// Fetches the files of a resolved version with the delivery policy applied.
    ///
    /// # Arguments
    /// - `script_name` - Script whose files are fetched
    /// - `version` - Label returned by the source's `current_version`
    pub async fn fetch_release(
        &self,
        script_name: &str,
        version: String,
    ) -> Result<DistributionRelease, DistributionError> {
        let files = self.source.fetch_files(script_name, &version).await?;
        let fetched = files.len();
        let files = self.policy.apply(files);

        tracing::debug!(
            "{} source returned {} files for {} {} ({} deliverable)",
            self.source.name(),
            fetched,
            script_name,
            version,
            files.len()
        );

        Ok(DistributionRelease {
            version,
            manifest: Manifest::from_files(files),
        })
    }

    /// Returns the current release when the caller's version differs from it.
    ///
    /// The version is looked up once and the files of exactly that version are fetched.
    /// Both steps together run under one deadline.
    ///
    /// # Returns
    /// - `Ok(None)` - Caller already runs the current version
    /// - `Ok(Some(release))` - Caller should update to `release`
    /// - `Err(DistributionError::Timeout)` - Fetch phase exceeded the deadline
    /// - `Err(DistributionError)` - Any upstream failure
    pub async fn check_for_update(
        &self,
        script_name: &str,
        caller_version: Option<&str>,
    ) -> Result<Option<DistributionRelease>, DistributionError> {
        let fetch = async {
            let current = self.source.current_version(script_name).await?;
            if caller_version == Some(current.as_str()) {
                return Ok(None);
            }

            self.fetch_release(script_name, current).await.map(Some)
        };

        tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| DistributionError::Timeout(self.fetch_timeout))?
    }
}

/// Extracts a version label from a descriptor body.
///
/// Accepts either `{"version": "..."}` or the bare label as plain text.
pub(crate) fn parse_version_descriptor(
    script_name: &str,
    body: &str,
) -> Result<String, DistributionError> {
    #[derive(serde::Deserialize)]
    struct VersionDescriptor {
        version: String,
    }

    let version = match serde_json::from_str::<VersionDescriptor>(body) {
        Ok(descriptor) => descriptor.version,
        Err(_) => body.to_string(),
    };

    let version = version.trim();
    if version.is_empty() {
        return Err(DistributionError::MissingVersion(script_name.to_string()));
    }

    Ok(version.to_string())
}
