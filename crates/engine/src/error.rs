//! Engine error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to spawn engine: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine closed its output stream")]
    Closed,

    #[error("Unexpected engine output: {0}")]
    Protocol(String),

    #[error("Engine returned illegal move {0}")]
    IllegalMove(String),

    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),
}
