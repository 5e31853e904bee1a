use std::sync::Arc;

use crate::server::{
    config::{Config, DistributionBackend, DistributionConfig},
    error::AppError,
    service::distribution::{
        archive::ArchiveSource, github::GitHubClient, policy::DeliveryPolicy,
        release::ReleaseSource, tree::TreeSource, DistributionService, DistributionSource,
    },
};

/// Maximum redirects followed when downloading files; release assets redirect to storage.
const MAX_REDIRECTS: usize = 5;

/// Connects to the database and runs pending migrations.
///
/// Establishes a connection pool using the connection string from configuration, then
/// automatically runs all pending SeaORM migrations to ensure the token store schema is
/// up-to-date. This function must complete successfully before the application can access
/// the database.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(Error)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<sea_orm::DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Builds the HTTP client used by every distribution backend.
///
/// Redirects are limited because release asset downloads answer with a redirect to
/// storage. reqwest drops the authorization header when a redirect changes host.
pub fn setup_reqwest_client(config: &DistributionConfig) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(config.fetch_timeout)
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))
}

/// Builds the distribution service for the configured backend.
///
/// # Arguments
/// - `config` - Distribution settings including the selected backend
/// - `http_client` - Shared HTTP client for upstream requests
///
/// # Returns
/// - `DistributionService` - Service wrapping the backend with the delivery policy
pub fn setup_distribution(
    config: &DistributionConfig,
    http_client: reqwest::Client,
) -> DistributionService {
    let policy = DeliveryPolicy::new(config.license_file_name.clone());
    let github = || {
        GitHubClient::new(
            http_client.clone(),
            config.api_url.clone(),
            config.token.clone(),
        )
    };

    let source: Arc<dyn DistributionSource> = match &config.backend {
        DistributionBackend::Tree {
            owner,
            git_ref,
            version_file,
        } => Arc::new(TreeSource::new(
            github(),
            owner.clone(),
            git_ref.clone(),
            version_file.clone(),
            policy.clone(),
            config.fetch_concurrency,
        )),
        DistributionBackend::Release { owner } => Arc::new(ReleaseSource::new(
            github(),
            owner.clone(),
            config.fetch_concurrency,
        )),
        DistributionBackend::Archive {
            url_template,
            version,
        } => Arc::new(ArchiveSource::new(
            http_client.clone(),
            url_template.clone(),
            version.clone(),
        )),
    };

    tracing::info!("Serving script updates from the {} source", source.name());

    DistributionService::new(source, policy, config.fetch_timeout)
}
