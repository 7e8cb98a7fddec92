use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use chess_core::strength::TierTable;
use engine::MAX_MULTIPV;

/// Which analysis backend serves `/suggest`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Stockfish,
    Heuristic,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stockfish" | "engine" => Ok(BackendKind::Stockfish),
            "heuristic" | "fallback" => Ok(BackendKind::Heuristic),
            other => bail!("unknown backend {other:?} (expected \"stockfish\" or \"heuristic\")"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Engine executable; a bare name is looked up on PATH
    pub stockfish_path: String,
    pub backend: BackendKind,
    pub analysis_timeout: Duration,
    pub multipv: u32,
    pub engine_threads: u32,
    pub engine_hash_mb: u32,
    pub tiers: TierTable,
    /// Include internal error details in 5xx bodies
    pub debug_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            stockfish_path: "stockfish".to_string(),
            backend: BackendKind::Stockfish,
            analysis_timeout: Duration::from_secs(30),
            multipv: 1,
            engine_threads: 1,
            engine_hash_mb: 16,
            tiers: TierTable::default(),
            debug_errors: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let tiers = match get("SKILL_TIERS") {
            Some(json) => TierTable::from_json(&json).context("Invalid SKILL_TIERS")?,
            None => defaults.tiers,
        };

        let multipv = parse_var(&get, "ENGINE_MULTIPV", defaults.multipv)?.max(1);
        if multipv > MAX_MULTIPV {
            bail!("Invalid ENGINE_MULTIPV={multipv}: at most {MAX_MULTIPV} lines are supported");
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_var(&get, "PORT", defaults.port)?,
            stockfish_path: get("STOCKFISH_PATH").unwrap_or(defaults.stockfish_path),
            backend: parse_var(&get, "ANALYSIS_BACKEND", defaults.backend)?,
            analysis_timeout: Duration::from_secs(parse_var(
                &get,
                "ANALYSIS_TIMEOUT_SECS",
                defaults.analysis_timeout.as_secs(),
            )?),
            multipv,
            engine_threads: parse_var(&get, "ENGINE_THREADS", defaults.engine_threads)?,
            engine_hash_mb: parse_var(&get, "ENGINE_HASH_MB", defaults.engine_hash_mb)?,
            tiers,
            debug_errors: get("DEBUG_ERRORS").is_some_and(|v| is_truthy(&v)),
        })
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key}={raw:?}: {e}")),
        None => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
