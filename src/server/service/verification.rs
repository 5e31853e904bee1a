//! Verification service for license claims.
//!
//! This module provides the `VerificationService`, which validates a claim (token, client
//! IP, script name, optional script version) against the token store and, once every
//! license check has passed, decides whether the caller needs the current script release.
//!
//! Checks short-circuit in a fixed order: required fields, token lookup, expiry, IP binding,
//! script binding. The distribution source is never consulted unless all of them pass.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::license_token::LicenseTokenRepository,
    error::{license::LicenseError, AppError},
    model::license::{LicenseRecord, VerifiedLicense, VerifyTokenParam},
    service::distribution::DistributionService,
};

/// A claim whose required fields are all present and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationClaim {
    pub token: String,
    pub client_ip: String,
    pub script_name: String,
    pub script_version: Option<String>,
}

impl VerificationClaim {
    /// Checks required fields, naming every missing one in the error.
    ///
    /// Blank strings count as missing. Fields are reported in the order `clientIp`,
    /// `token`, `scriptName`.
    pub fn from_param(param: VerifyTokenParam) -> Result<Self, AppError> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let client_ip = present(param.client_ip);
        let token = present(param.token);
        let script_name = present(param.script_name);

        match (client_ip, token, script_name) {
            (Some(client_ip), Some(token), Some(script_name)) => Ok(Self {
                token,
                client_ip,
                script_name,
                script_version: present(param.script_version),
            }),
            (client_ip, token, script_name) => {
                let missing: Vec<&str> = [
                    ("clientIp", client_ip.is_none()),
                    ("token", token.is_none()),
                    ("scriptName", script_name.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();

                Err(AppError::BadRequest(format!(
                    "Missing required fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

pub struct VerificationService<'a> {
    db: &'a DatabaseConnection,
    distribution: &'a DistributionService,
}

impl<'a> VerificationService<'a> {
    /// Creates a new VerificationService instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the token store connection
    /// - `distribution` - Service consulted after the license checks pass
    pub fn new(db: &'a DatabaseConnection, distribution: &'a DistributionService) -> Self {
        Self { db, distribution }
    }

    /// Verifies a claim and attaches the current release when the caller is outdated.
    ///
    /// # Arguments
    /// - `param` - Claim with the client IP already resolved
    ///
    /// # Returns
    /// - `Ok(VerifiedLicense)` - All checks passed
    /// - `Err(AppError::BadRequest)` - Required fields missing
    /// - `Err(AppError::LicenseErr)` - First failing license check
    /// - `Err(AppError::DistributionErr)` - Release could not be fetched in time
    /// - `Err(AppError::DbErr)` - Token store failure
    pub async fn verify(&self, param: VerifyTokenParam) -> Result<VerifiedLicense, AppError> {
        let claim = VerificationClaim::from_param(param)?;
        let now = Utc::now();

        let record = self.check_license(&claim, now).await?;

        let update = self
            .distribution
            .check_for_update(&claim.script_name, claim.script_version.as_deref())
            .await?;

        match &update {
            Some(release) => tracing::debug!(
                "Delivering {} {} ({} files) to {}",
                claim.script_name,
                release.version,
                release.manifest.file_count(),
                claim.client_ip
            ),
            None => tracing::debug!(
                "{} on {} is current",
                claim.script_name,
                claim.client_ip
            ),
        }

        Ok(VerifiedLicense {
            record,
            verified_at: now,
            update,
        })
    }

    /// Runs the license checks of a claim against the token store.
    ///
    /// # Arguments
    /// - `claim` - Validated claim
    /// - `now` - Reference time for the expiry check
    ///
    /// # Returns
    /// - `Ok(LicenseRecord)` - Token exists, is unexpired and bound to this IP and script
    /// - `Err(AppError::LicenseErr)` - First failing check
    /// - `Err(AppError::DbErr)` - Token store failure
    pub async fn check_license(
        &self,
        claim: &VerificationClaim,
        now: DateTime<Utc>,
    ) -> Result<LicenseRecord, AppError> {
        let repo = LicenseTokenRepository::new(self.db);

        let record = repo
            .find_by_token(&claim.token)
            .await?
            .ok_or_else(|| reject(claim, LicenseError::TokenNotFound))?;

        if record.is_expired(now) {
            return Err(reject(claim, LicenseError::Expired));
        }

        if record.client_ip != claim.client_ip {
            return Err(reject(claim, LicenseError::ClientIpMismatch));
        }

        if record.script_name != claim.script_name {
            return Err(reject(claim, LicenseError::ScriptNameMismatch));
        }

        Ok(record)
    }
}

fn reject(claim: &VerificationClaim, error: LicenseError) -> AppError {
    tracing::debug!(
        "Rejected claim for {} from {}: {}",
        claim.script_name,
        claim.client_ip,
        error
    );
    error.into()
}
