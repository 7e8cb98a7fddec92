//! Engine scores and their human-readable rendering.

use shakmaty::Color;

/// A position score as reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Hundredths of a pawn
    Centipawns(i32),
    /// Mate in N moves as the engine counts them; positive when the side the
    /// score is relative to delivers mate
    Mate(i32),
    /// No score available (heuristic backend, truncated engine output)
    Unknown,
}

impl Score {
    /// Convert a side-to-move relative score into White's point of view.
    pub fn for_white(self, turn: Color) -> Score {
        match (self, turn) {
            (_, Color::White) | (Score::Unknown, _) => self,
            (Score::Centipawns(cp), Color::Black) => Score::Centipawns(-cp),
            (Score::Mate(n), Color::Black) => Score::Mate(-n),
        }
    }
}

/// Evaluation string returned when no score applies.
pub const NO_EVALUATION: &str = "N/A";

/// Render a score for display: `+0.25`, `-1.10`, `Mate in 3` or `N/A`.
pub fn format_evaluation(score: Score) -> String {
    match score {
        Score::Centipawns(cp) => format!("{:+.2}", f64::from(cp) / 100.0),
        Score::Mate(n) => format!("Mate in {}", n.unsigned_abs()),
        Score::Unknown => NO_EVALUATION.to_string(),
    }
}
