//! License token repository for database operations.
//!
//! This module provides the `LicenseTokenRepository`, the token store shared by the
//! verification endpoint (read only) and the admin bot (create, update, delete). Entity
//! models are converted to `LicenseRecord` domain models at this boundary.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::model::license::{CreateLicenseTokenParam, LicenseField, LicenseRecord};

/// Repository providing database operations for license tokens.
pub struct LicenseTokenRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LicenseTokenRepository<'a> {
    /// Creates a new LicenseTokenRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `LicenseTokenRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new license token.
    ///
    /// `created_at` is set to the current time.
    ///
    /// # Arguments
    /// - `param` - Token string, bindings and expiration date for the new row
    ///
    /// # Returns
    /// - `Ok(LicenseRecord)` - The created record
    /// - `Err(DbErr)` - Database error, including a unique violation on `token`
    pub async fn create(&self, param: CreateLicenseTokenParam) -> Result<LicenseRecord, DbErr> {
        let entity = entity::license_token::ActiveModel {
            token: ActiveValue::Set(param.token),
            discord_id: ActiveValue::Set(param.discord_id),
            client_ip: ActiveValue::Set(param.client_ip),
            script_name: ActiveValue::Set(param.script_name),
            created_at: ActiveValue::Set(chrono::Utc::now()),
            expiration_date: ActiveValue::Set(param.expiration_date),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(LicenseRecord::from_entity(entity))
    }

    /// Finds a license record by its token string.
    ///
    /// # Arguments
    /// - `token` - Opaque token string, compared exactly
    ///
    /// # Returns
    /// - `Ok(Some(LicenseRecord))` - Token exists
    /// - `Ok(None)` - No row with that token
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_token(&self, token: &str) -> Result<Option<LicenseRecord>, DbErr> {
        let entity = entity::prelude::LicenseToken::find()
            .filter(entity::license_token::Column::Token.eq(token))
            .one(self.db)
            .await?;

        Ok(entity.map(LicenseRecord::from_entity))
    }

    /// Updates one column of an existing token.
    ///
    /// # Arguments
    /// - `token` - Token identifying the row to update
    /// - `field` - Column and new value
    ///
    /// # Returns
    /// - `Ok(Some(LicenseRecord))` - The record after the update
    /// - `Ok(None)` - No row with that token
    /// - `Err(DbErr)` - Database error during query or update
    pub async fn update_field(
        &self,
        token: &str,
        field: LicenseField,
    ) -> Result<Option<LicenseRecord>, DbErr> {
        let Some(existing) = entity::prelude::LicenseToken::find()
            .filter(entity::license_token::Column::Token.eq(token))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::license_token::ActiveModel = existing.into();
        match field {
            LicenseField::DiscordId(value) => active.discord_id = ActiveValue::Set(value),
            LicenseField::ClientIp(value) => active.client_ip = ActiveValue::Set(value),
            LicenseField::ScriptName(value) => active.script_name = ActiveValue::Set(value),
            LicenseField::ExpirationDate(value) => active.expiration_date = ActiveValue::Set(value),
        }

        let updated = active.update(self.db).await?;

        Ok(Some(LicenseRecord::from_entity(updated)))
    }

    /// Deletes a token.
    ///
    /// # Arguments
    /// - `token` - Token identifying the row to delete
    ///
    /// # Returns
    /// - `Ok(true)` - A row was removed
    /// - `Ok(false)` - No row with that token
    /// - `Err(DbErr)` - Database error during delete
    pub async fn delete(&self, token: &str) -> Result<bool, DbErr> {
        let result = entity::prelude::LicenseToken::delete_many()
            .filter(entity::license_token::Column::Token.eq(token))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
