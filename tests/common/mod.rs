#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use engine::testing::{self, Script};
use engine::{AnalysisBackend, EngineSession, FallbackSelector};
use reqwest::Client;
use server::advisor::Advisor;
use server::config::Config;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A running in-process server.
pub struct TestServer {
    pub base_url: String,
    pub advisor: Arc<Advisor>,
}

impl TestServer {
    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve `backend` on an ephemeral local port.
pub async fn spawn(backend: AnalysisBackend, config: Config) -> TestServer {
    let advisor = Arc::new(Advisor::new(backend, config.tiers.clone()));
    let app = server::app(advisor.clone(), &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        advisor,
    }
}

pub async fn spawn_heuristic() -> TestServer {
    spawn(
        AnalysisBackend::Heuristic(FallbackSelector::seeded(7)),
        Config::default(),
    )
    .await
}

pub async fn spawn_unavailable() -> TestServer {
    spawn(
        AnalysisBackend::Unavailable("not started".into()),
        Config::default(),
    )
    .await
}

/// Serve a scripted fake engine.
pub async fn spawn_engine(script: Script, config: Config) -> TestServer {
    let engine = testing::connect(script).await.unwrap();
    let session = EngineSession::new(engine, config.analysis_timeout, config.multipv);
    spawn(AnalysisBackend::Engine(session), config).await
}

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap()
}
