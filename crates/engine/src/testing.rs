//! Scripted in-memory UCI engine for tests.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use crate::error::EngineError;
use crate::stockfish::{EngineOptions, StockfishEngine};

/// Output the fake engine prints for `go`, keyed by the FEN last sent with
/// `position fen`.
pub type Script = Vec<(&'static str, Vec<&'static str>)>;

/// Start a fake engine task; returns the client's (reader, writer) ends.
///
/// Positions missing from the script answer `bestmove (none)`. A position
/// scripted with no output never finishes its search until `stop` arrives.
pub fn start(script: Script) -> (DuplexStream, DuplexStream) {
    let (client_read, mut engine_write) = tokio::io::duplex(64 * 1024);
    let (engine_read, client_write) = tokio::io::duplex(64 * 1024);

    tokio::spawn(async move {
        let mut lines = BufReader::new(engine_read).lines();
        let mut fen = String::new();
        while let Ok(Some(cmd)) = lines.next_line().await {
            let replies: Vec<&str> = if cmd == "uci" {
                vec!["id name FakeFish", "uciok"]
            } else if cmd == "isready" {
                vec!["readyok"]
            } else if let Some(f) = cmd.strip_prefix("position fen ") {
                fen = f.to_string();
                vec![]
            } else if cmd.starts_with("go") {
                match script.iter().find(|(f, _)| *f == fen) {
                    Some((_, out)) => out.clone(),
                    None => vec!["bestmove (none)"],
                }
            } else if cmd == "stop" {
                vec!["bestmove 0000"]
            } else if cmd == "quit" {
                break;
            } else {
                vec![]
            };

            for reply in replies {
                if engine_write
                    .write_all(format!("{reply}\n").as_bytes())
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }
    });

    (client_read, client_write)
}

/// Start a fake engine and complete the UCI handshake with it.
pub async fn connect(script: Script) -> Result<StockfishEngine, EngineError> {
    let (reader, writer) = start(script);
    StockfishEngine::connect(reader, writer, &EngineOptions::default()).await
}
