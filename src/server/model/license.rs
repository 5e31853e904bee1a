//! License domain models and parameters.
//!
//! Provides the `LicenseRecord` domain model stored in the token store, the derived
//! time math used by verification and by the admin bot, and the parameter types for
//! creating, updating and verifying tokens.

use chrono::{DateTime, Utc};

use crate::{
    model::license::{TokenInfoDto, VerifyTokenResponseDto},
    server::model::distribution::DistributionRelease,
};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// One authorization grant binding a token to an owner, an IP and a script.
///
/// `is_expired` and `days_remaining` are derived from `expiration_date` at call time and
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct LicenseRecord {
    /// Opaque lookup key.
    pub token: String,
    /// Discord ID of the human owner, informational only during verification.
    pub discord_id: String,
    /// The single client IP the token is bound to.
    pub client_ip: String,
    /// The single script the token is bound to.
    pub script_name: String,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
    /// When the token stops verifying.
    pub expiration_date: DateTime<Utc>,
}

impl LicenseRecord {
    /// Converts an entity model to a license domain model at the repository boundary.
    ///
    /// # Arguments
    /// - `entity` - The entity model from the database
    ///
    /// # Returns
    /// - `LicenseRecord` - The converted domain model
    pub fn from_entity(entity: entity::license_token::Model) -> Self {
        Self {
            token: entity.token,
            discord_id: entity.discord_id,
            client_ip: entity.client_ip,
            script_name: entity.script_name,
            created_at: entity.created_at,
            expiration_date: entity.expiration_date,
        }
    }

    /// Whether `now` is strictly past the expiration date.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_date
    }

    /// Whole days until expiration, rounding any partial day up.
    ///
    /// Expiration 10 days and 1 hour away yields 11. Past expiration dates produce zero
    /// or negative values, truncated towards zero.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.expiration_date - now).num_milliseconds();

        if millis > 0 {
            (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
        } else {
            millis / MILLIS_PER_DAY
        }
    }

    /// Converts the record to the `tokenInfo` DTO returned by the verify endpoint.
    ///
    /// # Arguments
    /// - `now` - Reference time for `daysRemaining`
    pub fn into_dto(self, now: DateTime<Utc>) -> TokenInfoDto {
        let days_remaining = self.days_remaining(now);

        TokenInfoDto {
            discord_id: self.discord_id,
            client_ip: self.client_ip,
            script_name: self.script_name,
            created_at: self.created_at,
            expiration_date: self.expiration_date,
            days_remaining,
        }
    }
}

/// Parameters for inserting a new token row.
#[derive(Debug, Clone)]
pub struct CreateLicenseTokenParam {
    pub token: String,
    pub discord_id: String,
    pub client_ip: String,
    pub script_name: String,
    pub expiration_date: DateTime<Utc>,
}

/// Parameters for issuing a token through the admin surface.
///
/// The token string and expiration date are derived by the service.
#[derive(Debug, Clone)]
pub struct IssueLicenseParam {
    pub discord_id: String,
    pub client_ip: String,
    pub script_name: String,
    /// Number of days the token stays valid, counted from issue time.
    pub validity_days: u32,
}

/// A single mutable column of a license record together with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum LicenseField {
    DiscordId(String),
    ClientIp(String),
    ScriptName(String),
    ExpirationDate(DateTime<Utc>),
}

impl LicenseField {
    /// Human readable column name used in operator feedback.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DiscordId(_) => "Discord ID",
            Self::ClientIp(_) => "client IP",
            Self::ScriptName(_) => "script name",
            Self::ExpirationDate(_) => "expiration date",
        }
    }
}

/// A verification claim after client IP resolution.
///
/// Empty strings are treated as missing by the verification service.
#[derive(Debug, Clone, Default)]
pub struct VerifyTokenParam {
    pub token: Option<String>,
    pub client_ip: Option<String>,
    pub script_name: Option<String>,
    pub script_version: Option<String>,
}

/// An accepted verification claim.
#[derive(Debug, Clone)]
pub struct VerifiedLicense {
    pub record: LicenseRecord,
    /// Reference time used for the expiry check and `days_remaining`.
    pub verified_at: DateTime<Utc>,
    /// Present when the caller's version differs from the current one.
    pub update: Option<DistributionRelease>,
}

impl VerifiedLicense {
    /// Converts the outcome to the verify endpoint's success body.
    ///
    /// `updateAvailable`, `latestVersion` and `files` are only set when an update is
    /// delivered.
    pub fn into_dto(self) -> VerifyTokenResponseDto {
        let token_info = self.record.into_dto(self.verified_at);

        let (update_available, latest_version, files) = match self.update {
            Some(release) => (
                Some(true),
                Some(release.version),
                Some(release.manifest.into_dto()),
            ),
            None => (None, None, None),
        };

        VerifyTokenResponseDto {
            message: "Token is valid".to_string(),
            token_info,
            update_available,
            latest_version,
            files,
        }
    }
}
