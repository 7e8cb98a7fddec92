//! Shared engine session.
//!
//! One Stockfish process serves every request. Configuration and analysis
//! for a request run under a single lock so one request's skill level can
//! never leak into another request's search.

use std::time::Duration;

use chess_core::strength::EngineStrength;
use shakmaty::{fen::Fen, Chess, EnPassantMode};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::stockfish::{CandidateMove, StockfishEngine};

/// Upper bound on draining a search after a timeout.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EngineSession {
    engine: Mutex<StockfishEngine>,
    timeout: Duration,
    multipv: u32,
}

impl EngineSession {
    pub fn new(engine: StockfishEngine, timeout: Duration, multipv: u32) -> Self {
        Self {
            engine: Mutex::new(engine),
            timeout,
            multipv: multipv.max(1),
        }
    }

    /// Configure and analyse as one critical section.
    pub async fn analyze(
        &self,
        pos: &Chess,
        strength: EngineStrength,
    ) -> Result<Vec<CandidateMove>, EngineError> {
        let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
        let mut engine = self.engine.lock().await;
        debug!(%fen, skill_level = strength.skill_level, depth = strength.depth, "Analyzing");

        let search = async {
            engine.configure(strength).await?;
            engine.analyze(&fen, self.multipv).await
        };

        let outcome = tokio::time::timeout(self.timeout, search).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(%fen, timeout = ?self.timeout, "Engine search timed out, stopping");
                match tokio::time::timeout(STOP_TIMEOUT, engine.stop()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Failed to stop engine search: {e}"),
                    Err(_) => warn!("Engine did not acknowledge stop"),
                }
                Err(EngineError::Timeout(self.timeout))
            }
        }
    }

    pub async fn shutdown(&self) {
        self.engine.lock().await.quit().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chess_core::position::parse_fen;
    use chess_core::score::Score;
    use shakmaty::uci::UciMove;

    use super::*;
    use crate::testing::{self, Script};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const HUNG_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    async fn session(script: Script, timeout: Duration) -> EngineSession {
        let engine = testing::connect(script).await.unwrap();
        EngineSession::new(engine, timeout, 1)
    }

    fn strength(skill_level: u8, depth: u32) -> EngineStrength {
        EngineStrength { skill_level, depth }
    }

    #[tokio::test]
    async fn test_analyze_returns_candidates() {
        let session = session(
            vec![(START_FEN, vec!["info depth 5 score cp 18 pv e2e4 e7e5", "bestmove e2e4"])],
            Duration::from_secs(5),
        )
        .await;

        let pos = parse_fen(START_FEN).unwrap();
        let candidates = session.analyze(&pos, strength(5, 8)).await.unwrap();
        assert_eq!(candidates[0].mv, "e2e4".parse::<UciMove>().unwrap());
        assert_eq!(candidates[0].score, Score::Centipawns(18));
    }

    #[tokio::test]
    async fn test_timeout_recovers_session() {
        let session = session(
            vec![
                (HUNG_FEN, vec![]),
                (START_FEN, vec!["info depth 5 score cp 18 pv d2d4", "bestmove d2d4"]),
            ],
            Duration::from_millis(100),
        )
        .await;

        let hung = parse_fen(HUNG_FEN).unwrap();
        let err = session.analyze(&hung, strength(20, 20)).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout(_)), "{err}");

        // The stale search was drained; the next request gets its own answer
        let pos = parse_fen(START_FEN).unwrap();
        let candidates = session.analyze(&pos, strength(1, 5)).await.unwrap();
        assert_eq!(candidates[0].mv, "d2d4".parse::<UciMove>().unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_not_interleaved() {
        let other_fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        let session = Arc::new(
            session(
                vec![
                    (START_FEN, vec!["info depth 5 score cp 18 pv e2e4", "bestmove e2e4"]),
                    (other_fen, vec!["info depth 5 score cp 40 pv g1f3", "bestmove g1f3"]),
                ],
                Duration::from_secs(5),
            )
            .await,
        );

        let mut handles = Vec::new();
        for i in 0..16 {
            let session = Arc::clone(&session);
            let fen = if i % 2 == 0 { START_FEN } else { other_fen };
            handles.push(tokio::spawn(async move {
                let pos = parse_fen(fen).unwrap();
                let candidates = session.analyze(&pos, strength(10, 12)).await.unwrap();
                (fen, candidates[0].mv.to_string())
            }));
        }

        for handle in handles {
            let (fen, mv) = handle.await.unwrap();
            let expected = if fen == START_FEN { "e2e4" } else { "g1f3" };
            assert_eq!(mv, expected);
        }
    }
}
