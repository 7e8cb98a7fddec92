pub mod advisor;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use axum::response::{IntoResponse, Response};
use engine::{AnalysisBackend, EngineOptions};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::advisor::Advisor;
use crate::config::{BackendKind, Config};
use crate::error::AppError;

/// Start the analysis backend the config asks for.
///
/// A Stockfish that cannot be launched does not abort startup; the service
/// runs degraded and answers 503 on `/suggest`.
pub async fn start_backend(config: &Config) -> AnalysisBackend {
    match config.backend {
        BackendKind::Stockfish => {
            let options = EngineOptions {
                threads: config.engine_threads,
                hash_mb: config.engine_hash_mb,
            };
            AnalysisBackend::launch(
                &config.stockfish_path,
                &options,
                config.analysis_timeout,
                config.multipv,
            )
            .await
        }
        BackendKind::Heuristic => {
            info!("Heuristic backend selected, Stockfish will not be started");
            AnalysisBackend::heuristic()
        }
    }
}

/// Build the HTTP router.
pub fn app(advisor: Arc<Advisor>, config: &Config) -> Router {
    // CORS: browser clients call /suggest from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Health
        .route("/", get(routes::health::health_check))
        .route("/health", get(routes::health::health_check))
        // Suggestions
        .route("/suggest", post(routes::suggest::suggest))
        .layer(Extension(advisor))
        .layer(CatchPanicLayer::custom(panic_response));

    if config.debug_errors {
        router = router.layer(axum::middleware::from_fn(middleware::expose_error_detail));
    }

    router.layer(CompressionLayer::new()).layer(cors)
}

/// A panicking handler answers like any other internal error.
fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::Internal(format!("handler panicked: {message}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use chess_core::strength::TierTable;
    use engine::FallbackSelector;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn router(backend: AnalysisBackend) -> Router {
        let advisor = Arc::new(Advisor::new(backend, TierTable::default()));
        app(advisor, &Config::default())
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_degraded_engine() {
        let (status, json) =
            get_json(router(AnalysisBackend::Unavailable("gone".into())), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "degraded (Stockfish not running)");
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_health_reports_heuristic() {
        let backend = AnalysisBackend::Heuristic(FallbackSelector::seeded(1));
        let (_, json) = get_json(router(backend), "/health").await;
        assert_eq!(
            json["status"],
            "degraded (heuristic fallback active, Stockfish not running)"
        );
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let response = router(AnalysisBackend::heuristic())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/suggest")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_responses_are_gzipped_on_request() {
        let response = router(AnalysisBackend::heuristic())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ACCEPT_ENCODING, "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    }

    #[tokio::test]
    async fn test_plain_response_without_accept_encoding() {
        let response = router(AnalysisBackend::heuristic())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        async fn boom() -> &'static str {
            panic!("board exploded")
        }

        let router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(axum::middleware::from_fn(middleware::expose_error_detail));

        let (status, json) = get_json(router, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "An internal server error occurred.");
        assert_eq!(json["detail"], "Internal server error: handler panicked: board exploded");
    }

    #[tokio::test]
    async fn test_bad_request_has_no_detail_in_debug_mode() {
        let advisor = Arc::new(Advisor::new(
            AnalysisBackend::heuristic(),
            TierTable::default(),
        ));
        let config = Config {
            debug_errors: true,
            ..Config::default()
        };

        // 4xx bodies never carry detail, even in debug mode
        let response = app(advisor, &config)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/suggest")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"elo": 1500}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("detail").is_none());
    }
}
