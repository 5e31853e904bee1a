//! HTTP request handlers.
//!
//! Controllers extract request data, convert DTOs to service parameters, call the service
//! layer and convert domain results back to DTOs. Errors are returned as `AppError` and
//! rendered by its `IntoResponse` implementation.

pub mod license;
