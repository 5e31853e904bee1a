use std::{net::SocketAddr, str::FromStr, time::Duration};

use url::Url;

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3333";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_REF: &str = "main";
const DEFAULT_VERSION_FILE: &str = "version.json";
const DEFAULT_LICENSE_FILE_NAME: &str = "token.lua";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FETCH_CONCURRENCY: usize = 8;

pub struct Config {
    pub database_url: String,
    pub discord_bot_token: String,
    pub bind_address: SocketAddr,
    pub distribution: DistributionConfig,
}

/// Settings shared by every distribution backend plus the selected backend itself.
#[derive(Clone)]
pub struct DistributionConfig {
    pub backend: DistributionBackend,
    pub api_url: Url,
    /// Static credential for the source-control API, sent as a bearer token.
    pub token: Option<String>,
    /// Filename of the license record, never delivered.
    pub license_file_name: String,
    /// Deadline applied to the whole fetch phase of one verification.
    pub fetch_timeout: Duration,
    /// Maximum number of sibling files fetched at once.
    pub fetch_concurrency: usize,
}

/// Which fetch strategy serves script updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionBackend {
    /// Walks the repository tree of `{owner}/{script}` at `git_ref`.
    Tree {
        owner: String,
        git_ref: String,
        version_file: String,
    },
    /// Downloads the assets of the latest release of `{owner}/{script}`.
    Release { owner: String },
    /// Downloads one zip archive; `{script}` in the URL is substituted.
    Archive { url_template: String, version: String },
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require =
            |name: &str| get(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()));

        let source = get("DISTRIBUTION_SOURCE").unwrap_or_else(|| "tree".to_string());
        let backend = match source.trim().to_ascii_lowercase().as_str() {
            "tree" => DistributionBackend::Tree {
                owner: require("DISTRIBUTION_OWNER")?,
                git_ref: get("DISTRIBUTION_REF").unwrap_or_else(|| DEFAULT_REF.to_string()),
                version_file: get("DISTRIBUTION_VERSION_FILE")
                    .unwrap_or_else(|| DEFAULT_VERSION_FILE.to_string()),
            },
            "release" => DistributionBackend::Release {
                owner: require("DISTRIBUTION_OWNER")?,
            },
            "archive" => DistributionBackend::Archive {
                url_template: require("DISTRIBUTION_ARCHIVE_URL")?,
                version: require("DISTRIBUTION_ARCHIVE_VERSION")?,
            },
            _ => {
                return Err(ConfigError::InvalidValue {
                    name: "DISTRIBUTION_SOURCE".to_string(),
                    value: source,
                }
                .into())
            }
        };

        let api_url = get("DISTRIBUTION_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url).map_err(|_| ConfigError::InvalidValue {
            name: "DISTRIBUTION_API_URL".to_string(),
            value: api_url.clone(),
        })?;

        let fetch_timeout_secs: u64 =
            parse_or("FETCH_TIMEOUT_SECS", get("FETCH_TIMEOUT_SECS"), DEFAULT_FETCH_TIMEOUT_SECS)?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FETCH_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        let fetch_concurrency: usize =
            parse_or("FETCH_CONCURRENCY", get("FETCH_CONCURRENCY"), DEFAULT_FETCH_CONCURRENCY)?;
        if fetch_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FETCH_CONCURRENCY".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        let bind_address = parse_or(
            "BIND_ADDRESS",
            get("BIND_ADDRESS"),
            SocketAddr::from_str(DEFAULT_BIND_ADDRESS).map_err(|_| ConfigError::InvalidValue {
                name: "BIND_ADDRESS".to_string(),
                value: DEFAULT_BIND_ADDRESS.to_string(),
            })?,
        )?;

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            discord_bot_token: require("DISCORD_BOT_TOKEN")?,
            bind_address,
            distribution: DistributionConfig {
                backend,
                api_url,
                token: get("DISTRIBUTION_TOKEN"),
                license_file_name: get("LICENSE_FILE_NAME")
                    .unwrap_or_else(|| DEFAULT_LICENSE_FILE_NAME.to_string()),
                fetch_timeout: Duration::from_secs(fetch_timeout_secs),
                fetch_concurrency,
            },
        })
    }
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "sqlite::memory:"),
        ("DISCORD_BOT_TOKEN", "bot"),
        ("DISTRIBUTION_OWNER", "acme"),
    ];

    #[test]
    fn applies_defaults() {
        let config = config_from(&BASE).unwrap();

        assert_eq!(config.bind_address.port(), 3333);
        assert_eq!(config.distribution.api_url.as_str(), "https://api.github.com/");
        assert_eq!(config.distribution.license_file_name, "token.lua");
        assert_eq!(config.distribution.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.distribution.fetch_concurrency, 8);
        assert!(config.distribution.token.is_none());
        assert_eq!(
            config.distribution.backend,
            DistributionBackend::Tree {
                owner: "acme".to_string(),
                git_ref: "main".to_string(),
                version_file: "version.json".to_string(),
            }
        );
    }

    #[test]
    fn selects_archive_backend() {
        let mut vars = BASE.to_vec();
        vars.push(("DISTRIBUTION_SOURCE", "archive"));
        vars.push(("DISTRIBUTION_ARCHIVE_URL", "https://cdn.example/{script}.zip"));
        vars.push(("DISTRIBUTION_ARCHIVE_VERSION", "1.0.0"));

        let config = config_from(&vars).unwrap();

        assert_eq!(
            config.distribution.backend,
            DistributionBackend::Archive {
                url_template: "https://cdn.example/{script}.zip".to_string(),
                version: "1.0.0".to_string(),
            }
        );
    }

    #[test]
    fn reports_missing_variable() {
        let result = config_from(&[("DISCORD_BOT_TOKEN", "bot"), ("DISTRIBUTION_OWNER", "acme")]);

        assert!(matches!(
            result,
            Err(AppError::ConfigErr(ConfigError::MissingEnvVar(name))) if name == "DATABASE_URL"
        ));
    }

    #[test]
    fn release_backend_requires_owner() {
        let result = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DISCORD_BOT_TOKEN", "bot"),
            ("DISTRIBUTION_SOURCE", "release"),
        ]);

        assert!(matches!(
            result,
            Err(AppError::ConfigErr(ConfigError::MissingEnvVar(name))) if name == "DISTRIBUTION_OWNER"
        ));
    }

    #[test]
    fn rejects_unknown_source_and_bad_numbers() {
        let mut vars = BASE.to_vec();
        vars.push(("DISTRIBUTION_SOURCE", "ftp"));
        assert!(matches!(
            config_from(&vars),
            Err(AppError::ConfigErr(ConfigError::InvalidValue { .. }))
        ));

        let mut vars = BASE.to_vec();
        vars.push(("FETCH_TIMEOUT_SECS", "soon"));
        assert!(matches!(
            config_from(&vars),
            Err(AppError::ConfigErr(ConfigError::InvalidValue { .. }))
        ));

        let mut vars = BASE.to_vec();
        vars.push(("FETCH_TIMEOUT_SECS", "0"));
        assert!(matches!(
            config_from(&vars),
            Err(AppError::ConfigErr(ConfigError::InvalidValue { name, .. })) if name == "FETCH_TIMEOUT_SECS"
        ));

        let mut vars = BASE.to_vec();
        vars.push(("FETCH_CONCURRENCY", "0"));
        assert!(matches!(
            config_from(&vars),
            Err(AppError::ConfigErr(ConfigError::InvalidValue { .. }))
        ));
    }
}
