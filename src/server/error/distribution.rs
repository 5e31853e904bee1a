use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

/// Failures while assembling a script update after the license was accepted.
///
/// Never confused with a license rejection: every variant maps to 500 and the caller
/// may retry the whole verification.
#[derive(Error, Debug)]
pub enum DistributionError {
    /// The remote host could not be reached or the body could not be read.
    #[error("Distribution request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote host answered with a non-success status.
    #[error("Distribution source returned {status} for {url}")]
    UpstreamStatus {
        /// Requested URL, never carrying credentials
        url: String,
        /// Status code returned by the remote host
        status: reqwest::StatusCode,
    },

    /// The version descriptor is missing or empty.
    #[error("No version available for script '{0}'")]
    MissingVersion(String),

    /// A listing, release or descriptor could not be interpreted.
    #[error("Malformed distribution manifest: {0}")]
    MalformedManifest(String),

    /// The downloaded archive could not be expanded.
    #[error("Failed to read distribution archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Reading an archive entry failed.
    #[error("Failed to read distribution archive entry: {0}")]
    Io(#[from] std::io::Error),

    /// The whole fetch phase exceeded its deadline.
    #[error("Distribution fetch timed out after {0:?}")]
    Timeout(Duration),

    /// A blocking expansion task panicked or was cancelled.
    #[error("Distribution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Converts delivery failures into 500 Internal Server Error responses.
///
/// The full error is logged server-side; the client only receives a generic message so
/// upstream bodies and URLs never leak.
impl IntoResponse for DistributionError {
    fn into_response(self) -> Response {
        tracing::error!("Failed to deliver script update: {}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDto {
                error: "Failed to retrieve script update".to_string(),
            }),
        )
            .into_response()
    }
}
