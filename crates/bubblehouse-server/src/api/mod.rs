mod embed;
mod sync;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use bubblehouse_catalog::CatalogSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};
use crate::scheduler::{SchedulerPhase, SyncScheduler};

pub struct AppState<S> {
    pub scheduler: Arc<SyncScheduler<S>>,
    pub block_version: Arc<str>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            block_version: Arc::clone(&self.block_version),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    scheduler: SchedulerPhase,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router<S: CatalogSource + 'static>(auth: AuthState) -> Router<AppState<S>> {
    Router::new()
        .route("/api/v1/sync/status", get(sync::sync_status::<S>))
        .route("/api/v1/sync/trigger", post(sync::trigger_sync::<S>))
        .route("/api/v1/embed/{page}", get(embed::embed_target::<S>))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app<S: CatalogSource + 'static>(state: AppState<S>, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health::<S>));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health<S: CatalogSource + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let snapshot = state.scheduler.snapshot().await;
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            scheduler: snapshot.phase,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bubblehouse_catalog::MemoryCatalog;
    use bubblehouse_core::SettingsSource;
    use bubblehouse_sync::{SyncRunner, MISSING_CONFIGURATION_PLACEHOLDER};
    use tower::ServiceExt;

    use super::*;

    struct Fixture {
        app: Router,
        settings_path: PathBuf,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.settings_path);
        }
    }

    async fn fixture(test: &str, settings_yaml: &str, keys: Option<&str>) -> Fixture {
        let settings_path = std::env::temp_dir().join(format!(
            "bubblehouse-api-{test}-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&settings_path, settings_yaml).expect("write settings");

        let runner = SyncRunner::new(
            MemoryCatalog::new(),
            SettingsSource::File(settings_path.clone()),
            "v2023061",
            5,
        )
        .expect("runner");
        let scheduler = SyncScheduler::new(Arc::new(runner), Duration::from_secs(3600))
            .await
            .expect("scheduler");

        let state = AppState {
            scheduler: Arc::new(scheduler),
            block_version: Arc::from("v2023061"),
        };
        let auth = AuthState::from_keys(keys, true).expect("auth");
        Fixture {
            app: build_app(state, auth),
            settings_path,
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json parse"))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn health_is_public_and_reports_phase() {
        let fixture = fixture("health", "", Some("secret-key")).await;
        let (status, json) = send(&fixture.app, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["scheduler"], "unscheduled");
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token() {
        let fixture = fixture("auth", "", Some("secret-key")).await;

        let (status, json) = send(&fixture.app, get("/api/v1/sync/status")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "unauthorized");

        let authorized = Request::builder()
            .uri("/api/v1/sync/status")
            .header("authorization", "Bearer secret-key")
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(&fixture.app, authorized).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn trigger_enqueues_once_then_reports_pending() {
        let fixture = fixture("trigger", "", None).await;

        let (status, json) = send(&fixture.app, post("/api/v1/sync/trigger")).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["data"]["status"], "enqueued");

        let (status, json) = send(&fixture.app, post("/api/v1/sync/trigger")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "already_pending");

        let (_, json) = send(&fixture.app, get("/api/v1/sync/status")).await;
        assert_eq!(json["data"]["pending_manual_run"], true);
        assert_eq!(json["data"]["periodic_armed"], false);
        assert!(json["data"]["last_cycle"].is_null());
    }

    #[tokio::test]
    async fn embed_without_settings_returns_placeholder() {
        let fixture = fixture("embed-missing", "shop_slug: acme\n", None).await;
        let (status, json) = send(&fixture.app, get("/api/v1/embed/Rewards7")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["kind"], "missing_configuration");
        assert_eq!(json["data"]["placeholder"], MISSING_CONFIGURATION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn embed_with_settings_returns_signed_frame() {
        let fixture = fixture(
            "embed-frame",
            "shop_slug: acme\nkid: key-1\nshared_secret: c2VjcmV0\n",
            None,
        )
        .await;
        let (status, json) = send(
            &fixture.app,
            get("/api/v1/embed/Wallet?customer_id=42"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["kind"], "frame");
        let iframe_url = json["data"]["iframe_url"].as_str().expect("iframe url");
        assert!(iframe_url.starts_with(
            "https://app.bubblehouse.com/blocks/v2023061/acme/Wallet?instance=bhpage&auth="
        ));
        assert_eq!(
            json["data"]["script_url"],
            "https://app.bubblehouse.com/s/acme/bubblehouse.js"
        );
    }
}
