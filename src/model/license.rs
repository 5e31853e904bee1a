use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/auth/verify`.
///
/// Every field is optional at the wire level so that absent values surface as a
/// 400 naming the missing field instead of a JSON rejection.
#[derive(Serialize, Deserialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenDto {
    #[serde(default)]
    pub token: Option<String>,
    /// Overrides the address derived from `X-Forwarded-For` or the connection peer.
    #[serde(default)]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub script_name: Option<String>,
    /// Version currently installed by the caller; absent means "send the latest".
    #[serde(default)]
    pub script_version: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfoDto {
    pub discord_id: String,
    pub client_ip: String,
    pub script_name: String,
    pub created_at: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub days_remaining: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponseDto {
    pub message: String,
    pub token_info: TokenInfoDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    /// Nested object keyed by path segment; leaves are file contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub files: Option<BTreeMap<String, ManifestEntryDto>>,
}

/// One node of a delivered manifest: either file content or a nested directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ManifestEntryDto {
    File(String),
    Directory(BTreeMap<String, ManifestEntryDto>),
}
