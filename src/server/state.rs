//! Application state shared across all request handlers.
//!
//! The state is initialized once during startup and then cloned for each request through
//! Axum's state extraction. It holds the token store connection and the distribution service
//! that serves script updates.

use sea_orm::DatabaseConnection;

use crate::server::service::distribution::DistributionService;

/// Application state containing shared resources and dependencies.
///
/// All fields are cheap to clone:
/// - `DatabaseConnection` is a connection pool (clones share the pool)
/// - `DistributionService` holds its source behind an `Arc`
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for the token store.
    pub db: DatabaseConnection,

    /// Configured distribution source plus delivery policy and fetch deadline.
    pub distribution: DistributionService,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `distribution` - Service delivering script updates
    ///
    /// # Returns
    /// - `AppState` - Initialized application state ready for use
    pub fn new(db: DatabaseConnection, distribution: DistributionService) -> Self {
        Self { db, distribution }
    }
}
