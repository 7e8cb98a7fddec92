//! Parsing of UCI engine output lines

use chess_core::score::Score;
use shakmaty::uci::UciMove;

/// One `info` line that carried a principal variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    /// 1-based line index (engines omit it when MultiPV is 1)
    pub multipv: u32,
    pub depth: Option<u32>,
    pub score: Score,
    pub pv: Vec<UciMove>,
}

/// Parse an `info` line. Returns `None` for lines without a PV
/// (`info string ...`, `info currmove ...`, node counters).
pub fn parse_info(line: &str) -> Option<InfoLine> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.first() != Some(&"info") {
        return None;
    }

    let pv_start = parts.iter().position(|p| *p == "pv")?;
    let pv = parse_pv(&parts[pv_start + 1..]);
    if pv.is_empty() {
        return None;
    }

    Some(InfoLine {
        multipv: value_after(&parts[..pv_start], "multipv").unwrap_or(1),
        depth: value_after(&parts[..pv_start], "depth"),
        score: parse_score(&parts[..pv_start]),
        pv,
    })
}

/// Parse a `bestmove` line into the move token, `Some(None)` when the engine
/// reports no move (`(none)` or `0000`), `None` for any other line.
pub fn parse_bestmove(line: &str) -> Option<Option<&str>> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    match parts.next() {
        None | Some("(none)") | Some("0000") => Some(None),
        Some(mv) => Some(Some(mv)),
    }
}

fn value_after<T: std::str::FromStr>(parts: &[&str], key: &str) -> Option<T> {
    parts
        .iter()
        .position(|p| *p == key)
        .and_then(|i| parts.get(i + 1))
        .and_then(|v| v.parse().ok())
}

/// Parse `score cp N` / `score mate N`
fn parse_score(parts: &[&str]) -> Score {
    let Some(i) = parts.iter().position(|p| *p == "score") else {
        return Score::Unknown;
    };
    let value = parts.get(i + 2).and_then(|v| v.parse::<i32>().ok());
    match (parts.get(i + 1).copied(), value) {
        (Some("cp"), Some(cp)) => Score::Centipawns(cp),
        (Some("mate"), Some(n)) => Score::Mate(n),
        _ => Score::Unknown,
    }
}

/// PV moves run to the end of the line; stop at trailing keywords or the
/// first token that is not a move.
fn parse_pv(parts: &[&str]) -> Vec<UciMove> {
    parts
        .iter()
        .take_while(|p| !p.starts_with("bmc") && **p != "string")
        .map_while(|p| p.parse::<UciMove>().ok())
        .collect()
}
