use std::sync::Arc;

use axum::{Extension, Json};
use serde::Serialize;

use crate::advisor::Advisor;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub status: String,
}

/// GET / and GET /health
pub async fn health_check(Extension(advisor): Extension<Arc<Advisor>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Chess move advisor API with Stockfish is running.",
        status: advisor.backend().status().describe(),
    })
}
