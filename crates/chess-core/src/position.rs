//! Position descriptor parsing and terminal-state detection.

use shakmaty::{fen::Fen, CastlingMode, Chess, Position};
use thiserror::Error;

/// Halfmove clock value at which the 75-move rule ends the game.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

#[derive(Error, Debug)]
pub enum PositionError {
    #[error("Invalid FEN: {0}")]
    Syntax(#[from] shakmaty::fen::ParseFenError),

    #[error("Illegal position: {0}")]
    Illegal(String),
}

/// Why a position has no game left to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
}

/// Parse a FEN string into a validated position.
///
/// Castling rights without the matching king and rook, and en passant
/// squares no pawn could have created, are dropped rather than rejected.
/// Anything else that cannot arise under standard rules (missing kings, side
/// not to move in check, ...) is an error.
pub fn parse_fen(fen: &str) -> Result<Chess, PositionError> {
    let fen: Fen = fen.trim().parse()?;
    fen.into_position(CastlingMode::Standard)
        .or_else(|e| e.ignore_invalid_castling_rights())
        .or_else(|e| e.ignore_invalid_ep_square())
        .map_err(|e| PositionError::Illegal(e.to_string()))
}

pub fn terminal_reason(pos: &Chess) -> Option<TerminalReason> {
    if pos.is_checkmate() {
        Some(TerminalReason::Checkmate)
    } else if pos.is_stalemate() {
        Some(TerminalReason::Stalemate)
    } else if pos.is_insufficient_material() {
        Some(TerminalReason::InsufficientMaterial)
    } else if pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
        Some(TerminalReason::SeventyFiveMoveRule)
    } else {
        None
    }
}

pub fn is_terminal(pos: &Chess) -> bool {
    terminal_reason(pos).is_some()
}
