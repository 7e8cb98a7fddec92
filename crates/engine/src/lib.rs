pub mod backend;
pub mod error;
pub mod fallback;
pub mod session;
pub mod stockfish;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod uci;

pub use backend::{AnalysisBackend, BackendStatus, Suggestion, SuggestionSource};
pub use error::EngineError;
pub use fallback::FallbackSelector;
pub use session::EngineSession;
pub use stockfish::{CandidateMove, EngineOptions, StockfishEngine, MAX_MULTIPV};
