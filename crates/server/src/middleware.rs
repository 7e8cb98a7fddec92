//! Debug-only error detail.
//!
//! `AppError` keeps internal error descriptions out of response bodies. When
//! `DEBUG_ERRORS` is set this middleware copies them back in as `detail`.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ErrorDetail;

pub async fn expose_error_detail(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;

    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail { error, detail }) => {
            let status = response.status();
            (status, Json(json!({ "error": error, "detail": detail }))).into_response()
        }
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, middleware, routing::get, Router};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::error::AppError;

    async fn failing_handler() -> Result<&'static str, AppError> {
        Err(AppError::Internal("engine pipe broke".into()))
    }

    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/fail", get(failing_handler))
            .route("/ok", get(ok_handler))
            .layer(middleware::from_fn(expose_error_detail))
    }

    #[tokio::test]
    async fn test_detail_added_to_server_errors() {
        let response = app()
            .oneshot(Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "An internal server error occurred.");
        assert_eq!(json["detail"], "Internal server error: engine pipe broke");
    }

    #[tokio::test]
    async fn test_success_untouched() {
        let response = app()
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }
}
