//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::process::Stdio;
use std::time::Duration;

use chess_core::score::Score;
use chess_core::strength::EngineStrength;
use shakmaty::uci::UciMove;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::uci::{parse_bestmove, parse_info};

/// Upper bound on the `uci`/`isready` handshake at startup.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest `MultiPV` Stockfish accepts.
pub const MAX_MULTIPV: u32 = 500;

/// A ranked move from engine analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMove {
    pub mv: UciMove,
    /// Score from the side to move's point of view
    pub score: Score,
    /// Continuation starting with `mv`; may be just `[mv]`
    pub pv: Vec<UciMove>,
}

/// Process-level engine options, applied once at startup
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub threads: u32,
    pub hash_mb: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 16,
        }
    }
}

type EngineReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;
type EngineWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Option<Child>,
    stdin: EngineWriter,
    stdout: EngineReader,
    depth: u32,
}

impl StockfishEngine {
    /// Spawn a Stockfish process and initialize UCI.
    ///
    /// A bare program name is resolved through `PATH`.
    pub async fn spawn(path: &str, options: &EngineOptions) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdin not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdout not captured".into()))?;

        let mut engine = Self::new(stdout, stdin);
        engine.process = Some(process);
        engine.handshake(options).await?;

        info!(path, threads = options.threads, hash_mb = options.hash_mb, "Stockfish ready");
        Ok(engine)
    }

    /// Talk UCI over arbitrary streams, e.g. an in-memory engine in tests.
    pub async fn connect<R, W>(
        reader: R,
        writer: W,
        options: &EngineOptions,
    ) -> Result<Self, EngineError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let mut engine = Self::new(reader, writer);
        engine.handshake(options).await?;
        Ok(engine)
    }

    fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            process: None,
            stdin: Box::new(writer),
            stdout: BufReader::new(Box::new(reader)),
            depth: 1,
        }
    }

    async fn handshake(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        let init = async {
            self.send("uci").await?;
            self.wait_for("uciok").await?;

            self.send(&format!("setoption name Threads value {}", options.threads))
                .await?;
            self.send(&format!("setoption name Hash value {}", options.hash_mb))
                .await?;
            self.sync().await
        };

        tokio::time::timeout(HANDSHAKE_TIMEOUT, init)
            .await
            .map_err(|_| EngineError::Timeout(HANDSHAKE_TIMEOUT))?
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "SF <");
        self.stdin.write_all(format!("{cmd}\n").as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Read one trimmed line; end of stream is an error.
    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line).await? == 0 {
            return Err(EngineError::Closed);
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        while self.read_line().await? != expected {}
        Ok(())
    }

    /// `isready` round trip; discards anything the engine printed before.
    async fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Set skill level and search depth for the next analysis.
    pub async fn configure(&mut self, strength: EngineStrength) -> Result<(), EngineError> {
        self.send(&format!(
            "setoption name Skill Level value {}",
            strength.skill_level
        ))
        .await?;
        self.depth = strength.depth.max(1);
        Ok(())
    }

    /// Analyse a position, returning up to `multipv` candidates best-first.
    ///
    /// The engine's `bestmove` always leads the list: with a reduced skill
    /// level the engine may deliberately pick a line other than its first.
    /// An empty list means the engine found no legal move.
    pub async fn analyze(
        &mut self,
        fen: &str,
        multipv: u32,
    ) -> Result<Vec<CandidateMove>, EngineError> {
        let multipv = multipv.clamp(1, MAX_MULTIPV);
        self.send(&format!("setoption name MultiPV value {multipv}"))
            .await?;
        self.send("ucinewgame").await?;
        self.sync().await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {}", self.depth)).await?;

        let mut lines: Vec<Option<CandidateMove>> = vec![None; multipv as usize];

        let best = loop {
            let line = self.read_line().await?;

            if let Some(info) = parse_info(&line) {
                let idx = info.multipv.saturating_sub(1) as usize;
                if let Some(slot) = lines.get_mut(idx) {
                    *slot = Some(CandidateMove {
                        mv: info.pv[0],
                        score: info.score,
                        pv: info.pv,
                    });
                }
            } else if let Some(best) = parse_bestmove(&line) {
                break best
                    .map(|mv| {
                        mv.parse::<UciMove>()
                            .map_err(|_| EngineError::Protocol(format!("bad bestmove: {line}")))
                    })
                    .transpose()?;
            }
        };

        let mut candidates: Vec<CandidateMove> = lines.into_iter().flatten().collect();

        let Some(best) = best else {
            return Ok(Vec::new());
        };

        match candidates.iter().position(|c| c.mv == best) {
            Some(i) => candidates[..=i].rotate_right(1),
            None => {
                let score = candidates.first().map_or(Score::Unknown, |c| c.score);
                candidates.insert(
                    0,
                    CandidateMove {
                        mv: best,
                        score,
                        pv: vec![best],
                    },
                );
                candidates.truncate(multipv as usize);
            }
        }

        Ok(candidates)
    }

    /// Abort a running search and drain its output up to `bestmove`.
    pub async fn stop(&mut self) -> Result<(), EngineError> {
        self.send("stop").await?;
        while parse_bestmove(&self.read_line().await?).is_none() {}
        Ok(())
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        if let Some(process) = self.process.as_mut() {
            let _ = process.wait().await;
        }
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        if let Some(process) = self.process.as_mut() {
            let _ = process.start_kill();
        }
    }
}
