use axum::{routing::get, Json, Router};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::server::{
    controller::license::{__path_verify_token, verify_token},
    state::AppState,
};

#[derive(OpenApi)]
#[openapi(info(
    title = "Scriptgate",
    description = "License verification and script update delivery"
))]
struct ApiDoc;

/// Builds the API router and serves its OpenAPI document at `/api/openapi.json`.
pub fn router() -> Router<AppState> {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(verify_token))
        .split_for_parts();

    router.route(
        "/api/openapi.json",
        get(move || {
            let api = api.clone();
            async move { Json(api) }
        }),
    )
}
