//! License token service for the administrative surface.
//!
//! This module provides the `LicenseTokenService`, used by the admin bot to issue, inspect,
//! edit and revoke tokens. Token strings are generated here and never chosen by operators.

use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::license_token::LicenseTokenRepository,
    error::AppError,
    model::license::{CreateLicenseTokenParam, IssueLicenseParam, LicenseField, LicenseRecord},
};

/// Random bytes per token; hex encoding doubles the length.
const TOKEN_BYTES: usize = 16;

/// Generates a fresh opaque token of 32 lowercase hex characters.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

pub struct LicenseTokenService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LicenseTokenService<'a> {
    /// Creates a new LicenseTokenService instance.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a new token valid for `validity_days` from now.
    ///
    /// # Arguments
    /// - `param` - Owner, bindings and validity of the new token
    ///
    /// # Returns
    /// - `Ok(LicenseRecord)` - The stored record including the generated token
    /// - `Err(AppError::BadRequest)` - Validity of zero days
    /// - `Err(AppError::DbErr)` - Database error during insert
    pub async fn issue(&self, param: IssueLicenseParam) -> Result<LicenseRecord, AppError> {
        if param.validity_days == 0 {
            return Err(AppError::BadRequest(
                "Validity must be at least one day".to_string(),
            ));
        }

        let record = LicenseTokenRepository::new(self.db)
            .create(CreateLicenseTokenParam {
                token: generate_token(),
                discord_id: param.discord_id,
                client_ip: param.client_ip,
                script_name: param.script_name,
                expiration_date: Utc::now() + Duration::days(param.validity_days as i64),
            })
            .await?;

        tracing::info!(
            "Issued token for {} bound to {} ({}), expires {}",
            record.discord_id,
            record.client_ip,
            record.script_name,
            record.expiration_date
        );

        Ok(record)
    }

    /// Looks a token up.
    ///
    /// # Returns
    /// - `Ok(Some(LicenseRecord))` - Token exists
    /// - `Ok(None)` - Unknown token
    /// - `Err(AppError::DbErr)` - Database error during query
    pub async fn get(&self, token: &str) -> Result<Option<LicenseRecord>, AppError> {
        Ok(LicenseTokenRepository::new(self.db)
            .find_by_token(token)
            .await?)
    }

    /// Replaces one column of an existing token.
    ///
    /// # Returns
    /// - `Ok(LicenseRecord)` - The record after the update
    /// - `Err(AppError::NotFound)` - Unknown token
    /// - `Err(AppError::DbErr)` - Database error during update
    pub async fn update_field(
        &self,
        token: &str,
        field: LicenseField,
    ) -> Result<LicenseRecord, AppError> {
        let label = field.label();

        let record = LicenseTokenRepository::new(self.db)
            .update_field(token, field)
            .await?
            .ok_or_else(|| AppError::NotFound("Token not found".to_string()))?;

        tracing::info!("Updated {} of token for {}", label, record.discord_id);

        Ok(record)
    }

    /// Resets the expiration date to `validity_days` from now.
    ///
    /// # Returns
    /// - `Ok(LicenseRecord)` - The record with its new expiration date
    /// - `Err(AppError::BadRequest)` - Validity of zero days
    /// - `Err(AppError::NotFound)` - Unknown token
    pub async fn extend(&self, token: &str, validity_days: u32) -> Result<LicenseRecord, AppError> {
        if validity_days == 0 {
            return Err(AppError::BadRequest(
                "Validity must be at least one day".to_string(),
            ));
        }

        let expiration_date = Utc::now() + Duration::days(validity_days as i64);
        self.update_field(token, LicenseField::ExpirationDate(expiration_date))
            .await
    }

    /// Revokes a token.
    ///
    /// # Returns
    /// - `Ok(())` - Token removed
    /// - `Err(AppError::NotFound)` - Unknown token
    pub async fn delete(&self, token: &str) -> Result<(), AppError> {
        let deleted = LicenseTokenRepository::new(self.db).delete(token).await?;
        if !deleted {
            return Err(AppError::NotFound("Token not found".to_string()));
        }

        tracing::info!("Deleted token {}", token);

        Ok(())
    }
}
