use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        license::{VerifyTokenDto, VerifyTokenResponseDto},
    },
    server::{
        error::AppError, middleware::client_ip::ClientAddress,
        model::license::VerifyTokenParam, service::verification::VerificationService,
        state::AppState,
    },
};

pub static LICENSE_TAG: &str = "license";

/// POST /api/auth/verify - Verify a license token and deliver script updates
///
/// The client IP is the body's `clientIp`, else the first `X-Forwarded-For` entry, else
/// the connection peer. When `scriptVersion` is absent or differs from the current
/// version, the response carries `updateAvailable`, `latestVersion` and `files`.
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = LICENSE_TAG,
    request_body = VerifyTokenDto,
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenResponseDto),
        (status = 400, description = "Missing token, client IP or script name", body = ErrorDto),
        (status = 401, description = "Unknown, expired or mismatched token", body = ErrorDto),
        (status = 500, description = "Script update could not be retrieved", body = ErrorDto)
    ),
)]
pub async fn verify_token(
    State(state): State<AppState>,
    address: ClientAddress,
    payload: Result<Json<VerifyTokenDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let param = VerifyTokenParam {
        client_ip: address.resolve(payload.client_ip),
        token: payload.token,
        script_name: payload.script_name,
        script_version: payload.script_version,
    };

    let verified = VerificationService::new(&state.db, &state.distribution)
        .verify(param)
        .await?;

    Ok((StatusCode::OK, Json(verified.into_dto())))
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, sync::Arc, time::Duration};

    use chrono::Duration as ChronoDuration;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use test_utils::{builder::TestBuilder, context::TestContext, factory::license_token::LicenseTokenFactory};

    use crate::server::{
        router,
        service::distribution::{
            policy::DeliveryPolicy,
            test::{sample_files, FailingSource, StaticSource},
            DistributionService, DistributionSource,
        },
        state::AppState,
    };

    struct TestServer {
        url: String,
        client: reqwest::Client,
        _context: TestContext,
    }

    impl TestServer {
        async fn start(source: impl DistributionSource + 'static) -> (Self, sea_orm::DatabaseConnection) {
            let context = TestBuilder::new().with_license_tables().build().await.unwrap();
            let db = context.db.clone().unwrap();
            let distribution = DistributionService::new(
                Arc::new(source),
                DeliveryPolicy::new("token.lua"),
                Duration::from_secs(5),
            );
            let app = router::router().with_state(AppState::new(db.clone(), distribution));

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(
                    listener,
                    app.into_make_service_with_connect_info::<SocketAddr>(),
                )
                .await
                .unwrap();
            });

            let server = Self {
                url: format!("http://{}", addr),
                client: reqwest::Client::new(),
                _context: context,
            };
            (server, db)
        }

        async fn verify(&self, body: Value, forwarded_for: Option<&str>) -> (StatusCode, Value) {
            let mut request = self.client.post(format!("{}/api/auth/verify", self.url)).json(&body);
            if let Some(forwarded_for) = forwarded_for {
                request = request.header("X-Forwarded-For", forwarded_for);
            }
            let response = request.send().await.unwrap();
            let status = response.status();
            (status, response.json().await.unwrap())
        }
    }

    fn current_source() -> StaticSource {
        StaticSource::new("1.2.0", sample_files())
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let (server, _db) = TestServer::start(current_source()).await;

        let (status, body) = server
            .verify(json!({ "clientIp": "10.0.0.1", "scriptVersion": "1.0.0" }), None)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: token, scriptName");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (server, _db) = TestServer::start(current_source()).await;

        let response = server
            .client
            .post(format!("{}/api/auth/verify", server.url))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn rejections_are_unauthorized_with_cause() {
        let (server, db) = TestServer::start(current_source()).await;
        let valid = LicenseTokenFactory::new(&db)
            .client_ip("10.0.0.1")
            .script_name("garage")
            .build()
            .await
            .unwrap();
        let expired = LicenseTokenFactory::new(&db)
            .client_ip("10.0.0.1")
            .script_name("garage")
            .expires_in(ChronoDuration::days(-1))
            .build()
            .await
            .unwrap();

        let cases = [
            (json!({ "token": "nope", "clientIp": "10.0.0.1", "scriptName": "garage" }),
                "Invalid token: token does not exist"),
            (json!({ "token": &expired.token, "clientIp": "10.9.9.9", "scriptName": "other" }),
                "Token expired"),
            (json!({ "token": &valid.token, "clientIp": "10.9.9.9", "scriptName": "other" }),
                "Invalid credentials: client IP mismatch"),
            (json!({ "token": &valid.token, "clientIp": "10.0.0.1", "scriptName": "other" }),
                "Invalid credentials: script name mismatch"),
        ];

        for (body, message) in cases {
            let (status, body) = server.verify(body, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], message);
        }
    }

    #[tokio::test]
    async fn current_version_gets_token_info_only() {
        let (server, db) = TestServer::start(current_source()).await;
        let stored = LicenseTokenFactory::new(&db)
            .discord_id("4242")
            .client_ip("10.0.0.1")
            .script_name("garage")
            .expires_in(ChronoDuration::days(10) + ChronoDuration::hours(1))
            .build()
            .await
            .unwrap();

        let (status, body) = server
            .verify(
                json!({ "token": &stored.token, "clientIp": "10.0.0.1", "scriptName": "garage", "scriptVersion": "1.2.0" }),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Token is valid");
        assert_eq!(body["tokenInfo"]["discordId"], "4242");
        assert_eq!(body["tokenInfo"]["clientIp"], "10.0.0.1");
        assert_eq!(body["tokenInfo"]["scriptName"], "garage");
        assert_eq!(body["tokenInfo"]["daysRemaining"], 11);
        assert!(body.get("updateAvailable").is_none());
        assert!(body.get("latestVersion").is_none());
        assert!(body.get("files").is_none());
    }

    #[tokio::test]
    async fn repeated_verification_returns_same_token_info() {
        let (server, db) = TestServer::start(current_source()).await;
        let stored = LicenseTokenFactory::new(&db)
            .client_ip("10.0.0.1")
            .script_name("garage")
            .build()
            .await
            .unwrap();
        let request = json!({ "token": &stored.token, "clientIp": "10.0.0.1", "scriptName": "garage", "scriptVersion": "1.2.0" });

        let (first_status, first) = server.verify(request.clone(), None).await;
        let (second_status, second) = server.verify(request, None).await;

        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first["tokenInfo"], second["tokenInfo"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn outdated_version_gets_filtered_files() {
        let (server, db) = TestServer::start(current_source()).await;
        let stored = LicenseTokenFactory::new(&db)
            .client_ip("10.0.0.1")
            .script_name("garage")
            .build()
            .await
            .unwrap();

        let (status, body) = server
            .verify(
                json!({ "token": &stored.token, "clientIp": "10.0.0.1", "scriptName": "garage", "scriptVersion": "1.1.0" }),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updateAvailable"], true);
        assert_eq!(body["latestVersion"], "1.2.0");
        assert_eq!(
            body["files"],
            json!({
                "fxmanifest.lua": "fx_version 'cerulean'",
                "server": { "main.lua": "print('server')" },
                "web": { "index.html": "<html></html>" }
            })
        );
    }

    #[tokio::test]
    async fn client_ip_falls_back_to_forwarded_header_then_peer() {
        let (server, db) = TestServer::start(current_source()).await;
        let forwarded = LicenseTokenFactory::new(&db)
            .client_ip("198.51.100.2")
            .script_name("garage")
            .build()
            .await
            .unwrap();
        let local = LicenseTokenFactory::new(&db)
            .client_ip("127.0.0.1")
            .script_name("garage")
            .build()
            .await
            .unwrap();

        let (status, _) = server
            .verify(
                json!({ "token": &forwarded.token, "scriptName": "garage", "scriptVersion": "1.2.0" }),
                Some("198.51.100.2, 10.0.0.1"),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = server
            .verify(
                json!({ "token": &local.token, "scriptName": "garage", "scriptVersion": "1.2.0" }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = server
            .verify(
                json!({ "token": &local.token, "clientIp": "203.0.113.1", "scriptName": "garage" }),
                Some("127.0.0.1"),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials: client IP mismatch");
    }

    #[tokio::test]
    async fn distribution_failure_is_server_error() {
        let (server, db) = TestServer::start(FailingSource).await;
        let stored = LicenseTokenFactory::new(&db)
            .client_ip("10.0.0.1")
            .script_name("garage")
            .build()
            .await
            .unwrap();

        let (status, body) = server
            .verify(
                json!({ "token": &stored.token, "clientIp": "10.0.0.1", "scriptName": "garage" }),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to retrieve script update");
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let (server, _db) = TestServer::start(current_source()).await;

        let document: Value = server
            .client
            .get(format!("{}/api/openapi.json", server.url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert!(document["paths"]["/api/auth/verify"]["post"].is_object());
    }
}
