use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chess_core::position::PositionError;
use engine::EngineError;
use serde_json::json;

pub const ENGINE_UNAVAILABLE_MESSAGE: &str = "Stockfish engine is not available.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Stockfish engine is not available.")]
    EngineUnavailable,

    #[error(transparent)]
    Engine(EngineError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Unavailable(_) => AppError::EngineUnavailable,
            other => AppError::Engine(other),
        }
    }
}

impl From<PositionError> for AppError {
    fn from(e: PositionError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

/// Internal description of a 5xx error, attached to the response for the
/// debug middleware. Never serialized unless debug errors are enabled.
#[derive(Clone, Debug)]
pub struct ErrorDetail {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::EngineUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ENGINE_UNAVAILABLE_MESSAGE.to_string(),
            ),
            AppError::Engine(e) => {
                tracing::error!("Engine error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if status.is_server_error() {
            response.extensions_mut().insert(ErrorDetail {
                error: message,
                detail: self.to_string(),
            });
        }
        response
    }
}
