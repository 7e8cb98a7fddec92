use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::advisor::{Advisor, SuggestionResult};
use crate::error::AppError;

/// A rating as clients send it: `1500`, `1500.0` or `"1500"`.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Rating {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Rating {
    pub fn to_elo(&self) -> Result<i64, AppError> {
        match self {
            Rating::Integer(elo) => Ok(*elo),
            Rating::Float(elo) if elo.is_finite() => Ok(elo.trunc() as i64),
            Rating::Float(_) => Err(AppError::BadRequest("elo must be a finite number".into())),
            Rating::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| AppError::BadRequest(format!("elo must be an integer, got {text:?}"))),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SuggestRequest {
    pub fen: Option<String>,
    pub elo: Option<Rating>,
}

/// POST /suggest
/// Recommend a move for a position at a target playing strength.
pub async fn suggest(
    Extension(advisor): Extension<Arc<Advisor>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SuggestionResult>, AppError> {
    // An engine that failed at startup answers 503 regardless of the body
    if !advisor.backend().is_available() {
        return Err(AppError::EngineUnavailable);
    }

    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    // serde would otherwise accept `[fen, elo]` as a struct in field order
    if !body.is_object() {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".into(),
        ));
    }
    let req: SuggestRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;

    let fen = req
        .fen
        .filter(|fen| !fen.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required field: fen".into()))?;
    let elo = req
        .elo
        .ok_or_else(|| AppError::BadRequest("Missing required field: elo".into()))?
        .to_elo()?;

    advisor.suggest(&fen, elo).await.map(Json)
}
