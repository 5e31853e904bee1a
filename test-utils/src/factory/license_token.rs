//! License token factory for creating test token rows.
//!
//! This module provides factory methods for creating license token entities with sensible
//! defaults, reducing boilerplate in tests. The factory supports customization through a
//! builder pattern.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test license tokens with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::license_token::LicenseTokenFactory;
///
/// let token = LicenseTokenFactory::new(&db)
///     .client_ip("203.0.113.7")
///     .script_name("garage")
///     .expires_in(Duration::days(3))
///     .build()
///     .await?;
/// ```
pub struct LicenseTokenFactory<'a> {
    db: &'a DatabaseConnection,
    token: String,
    discord_id: String,
    client_ip: String,
    script_name: String,
    created_at: DateTime<Utc>,
    expiration_date: DateTime<Utc>,
}

impl<'a> LicenseTokenFactory<'a> {
    /// Creates a new LicenseTokenFactory with default values.
    ///
    /// Defaults:
    /// - token: `"token{id:027}"` (32 characters) where id is auto-incremented
    /// - discord_id: `"{id}"`
    /// - client_ip: `"127.0.0.1"`
    /// - script_name: `"script"`
    /// - created_at: now
    /// - expiration_date: now + 30 days
    ///
    /// # Arguments
    /// - `db` - Database connection for inserting the entity
    ///
    /// # Returns
    /// - `LicenseTokenFactory` - New factory instance with defaults
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        let now = Utc::now();
        Self {
            db,
            token: format!("token{:027}", id),
            discord_id: id.to_string(),
            client_ip: "127.0.0.1".to_string(),
            script_name: "script".to_string(),
            created_at: now,
            expiration_date: now + Duration::days(30),
        }
    }

    /// Sets the opaque token string.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Sets the Discord ID of the token owner.
    pub fn discord_id(mut self, discord_id: impl Into<String>) -> Self {
        self.discord_id = discord_id.into();
        self
    }

    /// Sets the client IP the token is bound to.
    pub fn client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = client_ip.into();
        self
    }

    /// Sets the script name the token is bound to.
    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self
    }

    /// Sets an absolute expiration date.
    pub fn expiration_date(mut self, expiration_date: DateTime<Utc>) -> Self {
        self.expiration_date = expiration_date;
        self
    }

    /// Sets the expiration date relative to now.
    ///
    /// Negative durations produce an already expired token.
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expiration_date = Utc::now() + duration;
        self
    }

    /// Builds and inserts the license token entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::license_token::Model)` - Created token entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::license_token::Model, DbErr> {
        entity::license_token::ActiveModel {
            token: ActiveValue::Set(self.token),
            discord_id: ActiveValue::Set(self.discord_id),
            client_ip: ActiveValue::Set(self.client_ip),
            script_name: ActiveValue::Set(self.script_name),
            created_at: ActiveValue::Set(self.created_at),
            expiration_date: ActiveValue::Set(self.expiration_date),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a license token with default values.
///
/// Shorthand for `LicenseTokenFactory::new(db).build().await`.
pub async fn create_license_token(
    db: &DatabaseConnection,
) -> Result<entity::license_token::Model, DbErr> {
    LicenseTokenFactory::new(db).build().await
}

/// Creates a license token that expired one day ago.
pub async fn create_expired_license_token(
    db: &DatabaseConnection,
) -> Result<entity::license_token::Model, DbErr> {
    LicenseTokenFactory::new(db)
        .expires_in(Duration::days(-1))
        .build()
        .await
}
