//! Request orchestration for move suggestions.

use chess_core::explain::explain;
use chess_core::position::{parse_fen, terminal_reason};
use chess_core::score::{format_evaluation, NO_EVALUATION};
use chess_core::strength::TierTable;
use engine::{AnalysisBackend, SuggestionSource};
use serde::Serialize;
use shakmaty::{uci::UciMove, CastlingMode};
use tracing::info;

use crate::error::AppError;

pub const GAME_OVER: &str = "The game is over.";
pub const NO_LEGAL_MOVES: &str = "No legal moves available.";

/// Response body for `POST /suggest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionResult {
    pub best_move: Option<String>,
    pub explanation: String,
    pub evaluation: String,
}

impl SuggestionResult {
    fn without_move(reason: &str) -> Self {
        Self {
            best_move: None,
            explanation: reason.to_string(),
            evaluation: NO_EVALUATION.to_string(),
        }
    }
}

pub struct Advisor {
    backend: AnalysisBackend,
    tiers: TierTable,
}

impl Advisor {
    pub fn new(backend: AnalysisBackend, tiers: TierTable) -> Self {
        Self { backend, tiers }
    }

    pub fn backend(&self) -> &AnalysisBackend {
        &self.backend
    }

    /// Suggest a move for `fen` at roughly the playing strength `elo`.
    pub async fn suggest(&self, fen: &str, elo: i64) -> Result<SuggestionResult, AppError> {
        if !self.backend.is_available() {
            return Err(AppError::EngineUnavailable);
        }

        let pos = parse_fen(fen)?;
        if let Some(reason) = terminal_reason(&pos) {
            info!(fen, ?reason, "Game over, nothing to suggest");
            return Ok(SuggestionResult::without_move(GAME_OVER));
        }

        let strength = self.tiers.map(elo);
        let Some(suggestion) = self.backend.suggest(&pos, strength).await? else {
            info!(fen, "No legal moves");
            return Ok(SuggestionResult::without_move(NO_LEGAL_MOVES));
        };

        let best_move = UciMove::from_move(suggestion.mv, CastlingMode::Standard).to_string();
        let mut explanation = explain(&pos, suggestion.mv, &suggestion.pv);
        explanation.push(' ');
        explanation.push_str(&match suggestion.source {
            SuggestionSource::Engine => format!(
                "Stockfish (rating approx. {elo}) suggests this move after analyzing to a depth of {}.",
                strength.depth
            ),
            SuggestionSource::Heuristic => format!(
                "No engine analysis was available; this move was picked by a tactical heuristic for a rating of approx. {elo}."
            ),
        });
        let evaluation = format_evaluation(suggestion.score);

        info!(
            fen,
            elo,
            skill_level = strength.skill_level,
            depth = strength.depth,
            best_move = %best_move,
            evaluation = %evaluation,
            "Suggested move"
        );

        Ok(SuggestionResult {
            best_move: Some(best_move),
            explanation,
            evaluation,
        })
    }
}
