//! Natural-language rationale for a suggested move.

use shakmaty::{san::SanPlus, uci::UciMove, Chess, Move, Position, Role};

/// Number of plies described in a forecast.
const FORECAST_PLIES: usize = 3;

/// Clause templates for successive forecast plies.
const FORECAST_CLAUSES: [&str; FORECAST_PLIES] =
    ["you play", "opponent likely responds", "you continue"];

/// Tactical category of a move. Checks take precedence over captures, and
/// captures over castling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCategory {
    Check,
    Capture(Role),
    Castle,
    Positional,
}

pub fn categorize(pos: &Chess, mv: Move) -> MoveCategory {
    let mut after = pos.clone();
    after.play_unchecked(mv);

    if after.is_check() {
        MoveCategory::Check
    } else if let Some(role) = mv.capture() {
        MoveCategory::Capture(role)
    } else if mv.is_castle() {
        MoveCategory::Castle
    } else {
        MoveCategory::Positional
    }
}

pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

/// Describe `chosen` in `pos`, appending a short forecast when `pv` (the
/// engine line, starting with the chosen move) can be replayed.
pub fn explain(pos: &Chess, chosen: Move, pv: &[UciMove]) -> String {
    let san = SanPlus::from_move(pos.clone(), chosen);

    let mut text = match categorize(pos, chosen) {
        MoveCategory::Check => {
            format!("{san} puts the opponent's king in check, forcing a response.")
        }
        MoveCategory::Capture(role) => {
            format!("{san} captures the opponent's {}.", role_name(role))
        }
        MoveCategory::Castle => {
            format!("{san} castles, moving the king to safety and connecting the rooks.")
        }
        MoveCategory::Positional => {
            format!("{san} improves the placement of your pieces and strengthens your position.")
        }
    };

    if let Some(line) = forecast(pos, chosen, pv) {
        text.push_str(" Likely continuation: ");
        text.push_str(&line);
        text.push('.');
    }

    text
}

/// Render the first plies of `pv` as clauses, or `None` if the line is too
/// short, does not start with `chosen`, or stops being legal.
fn forecast(pos: &Chess, chosen: Move, pv: &[UciMove]) -> Option<String> {
    if pv.len() < 2 {
        return None;
    }

    let mut board = pos.clone();
    let mut clauses = Vec::with_capacity(FORECAST_PLIES);

    for (ply, uci) in pv.iter().take(FORECAST_PLIES).enumerate() {
        let mv = uci.to_move(&board).ok()?;
        if ply == 0 && mv != chosen {
            return None;
        }
        let san = SanPlus::from_move_and_play_unchecked(&mut board, mv);
        clauses.push(format!("{} {san}", FORECAST_CLAUSES[ply]));
    }

    Some(clauses.join(", "))
}
