//! Analysis backend chosen once at startup.

use std::time::Duration;

use chess_core::score::Score;
use chess_core::strength::EngineStrength;
use shakmaty::{uci::UciMove, Chess, Move, Position};
use tracing::{error, info};

use crate::error::EngineError;
use crate::fallback::FallbackSelector;
use crate::session::EngineSession;
use crate::stockfish::{EngineOptions, StockfishEngine};

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Engine,
    Heuristic,
}

/// A chosen move with its supporting analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub mv: Move,
    /// Position score from White's point of view
    pub score: Score,
    /// Expected continuation starting with `mv`; empty for heuristic picks
    pub pv: Vec<UciMove>,
    pub source: SuggestionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Healthy,
    Degraded(&'static str),
}

impl BackendStatus {
    pub fn describe(&self) -> String {
        match self {
            BackendStatus::Healthy => "healthy".to_string(),
            BackendStatus::Degraded(why) => format!("degraded ({why})"),
        }
    }
}

pub enum AnalysisBackend {
    /// Strength-aware engine shared by all requests
    Engine(EngineSession),
    /// Biased-random picks, no engine involved
    Heuristic(FallbackSelector),
    /// The engine failed to start; permanent until restart
    Unavailable(String),
}

impl AnalysisBackend {
    /// Start Stockfish, degrading to `Unavailable` if it cannot be launched.
    pub async fn launch(
        path: &str,
        options: &EngineOptions,
        timeout: Duration,
        multipv: u32,
    ) -> Self {
        match StockfishEngine::spawn(path, options).await {
            Ok(engine) => {
                info!("Stockfish engine initialized successfully");
                AnalysisBackend::Engine(EngineSession::new(engine, timeout, multipv))
            }
            Err(e) => {
                error!(path, "CRITICAL: failed to initialize Stockfish: {e}");
                AnalysisBackend::Unavailable(e.to_string())
            }
        }
    }

    pub fn heuristic() -> Self {
        AnalysisBackend::Heuristic(FallbackSelector::default())
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, AnalysisBackend::Unavailable(_))
    }

    pub fn status(&self) -> BackendStatus {
        match self {
            AnalysisBackend::Engine(_) => BackendStatus::Healthy,
            AnalysisBackend::Heuristic(_) => {
                BackendStatus::Degraded("heuristic fallback active, Stockfish not running")
            }
            AnalysisBackend::Unavailable(_) => BackendStatus::Degraded("Stockfish not running"),
        }
    }

    /// Pick a move for `pos`. `Ok(None)` means the position has no legal move.
    pub async fn suggest(
        &self,
        pos: &Chess,
        strength: EngineStrength,
    ) -> Result<Option<Suggestion>, EngineError> {
        match self {
            AnalysisBackend::Engine(session) => {
                let candidates = session.analyze(pos, strength).await?;
                let Some(best) = candidates.into_iter().next() else {
                    return Ok(None);
                };
                let mv = best
                    .mv
                    .to_move(pos)
                    .map_err(|_| EngineError::IllegalMove(best.mv.to_string()))?;
                Ok(Some(Suggestion {
                    mv,
                    score: best.score.for_white(pos.turn()),
                    pv: best.pv,
                    source: SuggestionSource::Engine,
                }))
            }
            AnalysisBackend::Heuristic(selector) => {
                Ok(selector.select(pos, strength.skill_level).map(|mv| Suggestion {
                    mv,
                    score: Score::Unknown,
                    pv: Vec::new(),
                    source: SuggestionSource::Heuristic,
                }))
            }
            AnalysisBackend::Unavailable(reason) => Err(EngineError::Unavailable(reason.clone())),
        }
    }

    pub async fn shutdown(&self) {
        if let AnalysisBackend::Engine(session) = self {
            session.shutdown().await;
        }
    }
}
