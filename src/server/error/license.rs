use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

/// Reasons a well-formed verification claim is rejected.
///
/// Checked in declaration order; only the first applicable cause is ever reported.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LicenseError {
    /// No license record exists for the presented token.
    #[error("Invalid token: token does not exist")]
    TokenNotFound,

    /// The record exists but its expiration date has passed.
    ///
    /// Reported before any binding check so an expired token reveals nothing about its
    /// bound IP or script.
    #[error("Token expired")]
    Expired,

    /// The caller's IP differs from the IP the token is bound to.
    #[error("Invalid credentials: client IP mismatch")]
    ClientIpMismatch,

    /// The requested script differs from the script the token is bound to.
    #[error("Invalid credentials: script name mismatch")]
    ScriptNameMismatch,
}

/// Converts license rejections into 401 Unauthorized responses naming the cause.
impl IntoResponse for LicenseError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorDto {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
