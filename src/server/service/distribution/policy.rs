//! Delivery policy shared by every distribution backend.
//!
//! Backends produce raw file lists; this policy decides which entries may ever leave the
//! server. It is applied once, uniformly, after any backend has run, so the exclusion rules
//! cannot drift between backends.

use crate::server::model::distribution::DistributionFile;

/// Directory segment whose contents are private to the script author.
const SHARED_SEGMENT: &str = "shared";

/// Directory segment limited to front-end assets.
const WEB_SEGMENT: &str = "web";

/// Extensions deliverable from inside a `web` directory.
const WEB_EXTENSIONS: [&str; 4] = ["html", "htm", "js", "css"];

#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    license_file_name: String,
}

impl DeliveryPolicy {
    /// Creates a policy that never delivers files named `license_file_name`.
    pub fn new(license_file_name: impl Into<String>) -> Self {
        Self {
            license_file_name: license_file_name.into(),
        }
    }

    /// Whether a file at `path` may be delivered.
    ///
    /// Rejects the license record file at any depth, anything below a `shared` directory
    /// and, below a `web` directory, anything that is not markup, script or style.
    pub fn allows(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file_name, directories)) = segments.split_last() else {
            return false;
        };

        if *file_name == self.license_file_name {
            return false;
        }

        if directories.iter().any(|d| d.eq_ignore_ascii_case(SHARED_SEGMENT)) {
            return false;
        }

        if directories.iter().any(|d| d.eq_ignore_ascii_case(WEB_SEGMENT)) {
            return has_web_extension(file_name);
        }

        true
    }

    /// Whether a directory is worth descending into while listing a tree.
    pub fn allows_directory(&self, path: &str) -> bool {
        !path
            .split('/')
            .any(|segment| segment.eq_ignore_ascii_case(SHARED_SEGMENT))
    }

    /// Keeps only the files this policy allows.
    pub fn apply(&self, files: Vec<DistributionFile>) -> Vec<DistributionFile> {
        files
            .into_iter()
            .filter(|file| {
                let allowed = self.allows(&file.path);
                if !allowed {
                    tracing::debug!("Withholding {} from delivery", file.path);
                }
                allowed
            })
            .collect()
    }
}

fn has_web_extension(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => WEB_EXTENSIONS
            .iter()
            .any(|allowed| extension.eq_ignore_ascii_case(allowed)),
        _ => false,
    }
}
