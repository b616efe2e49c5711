//! HTTP server for Prometheus metrics endpoint.

use crate::metrics::MetricsRegistry;
use crate::study::ResultSet;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not bind.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// The server stopped with an error.
    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 9090).into(),
        }
    }
}

impl MetricsServerConfig {
    /// Creates a config with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], port).into(),
        }
    }
}

/// Shared state for the metrics server.
pub struct MetricsState {
    registry: MetricsRegistry,
    latest: Option<ResultSet>,
}

impl MetricsState {
    /// Records a run, replacing the previous one.
    pub fn update(&mut self, results: ResultSet) {
        self.registry.update(&results);
        self.latest = Some(results);
    }
}

/// HTTP server exposing run metrics and the latest report.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<RwLock<MetricsState>>,
}

impl MetricsServer {
    /// Creates a new metrics server.
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                latest: None,
            })),
        }
    }

    /// Returns a reference to the shared state for updating metrics.
    pub fn state(&self) -> Arc<RwLock<MetricsState>> {
        Arc::clone(&self.state)
    }

    /// Starts the HTTP server.
    ///
    /// This method runs the server until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = router(self.state);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

fn router(state: Arc<RwLock<MetricsState>>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/report", get(report_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> impl IntoResponse {
    let state = state.read().await;

    match state.registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Handler for the /report endpoint: the latest run as JSON.
async fn report_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> Response {
    let state = state.read().await;

    match &state.latest {
        Some(results) => Json(results).into_response(),
        None => (StatusCode::NOT_FOUND, "no run recorded yet\n").into_response(),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.bind_addr.port(), 9090);
    }

    #[test]
    fn test_config_with_port() {
        let config = MetricsServerConfig::with_port(8080);
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[tokio::test]
    async fn test_state_keeps_latest_run() {
        use crate::analysis::QualityAnalyzer;
        use crate::sources::SourceRegistry;
        use crate::study::{RunRequest, Study};

        let server = MetricsServer::new(
            MetricsServerConfig::default(),
            MetricsRegistry::new().unwrap(),
        );
        let study = Study::new(SourceRegistry::default(), QualityAnalyzer::default());
        let results = study.run(&RunRequest::new(["missing"], 16)).unwrap();

        let state = server.state();
        state.write().await.update(results);

        let guard = state.read().await;
        assert_eq!(guard.latest.as_ref().map(|r| r.len()), Some(1));
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        use axum::body::{to_bytes, Body};
        use axum::http::Request;
        use tower::ServiceExt;

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_routes_serve_latest_run() {
        use crate::analysis::QualityAnalyzer;
        use crate::sources::{DeterministicSource, SourceRegistry};
        use crate::study::{RunRequest, Study};

        let server = MetricsServer::new(
            MetricsServerConfig::default(),
            MetricsRegistry::new().unwrap(),
        );
        let state = server.state();

        let (status, _) = get_body(router(Arc::clone(&state)), "/report").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let mut registry = SourceRegistry::default();
        registry.register("prng", "PRNG", Box::new(DeterministicSource::seeded(1)));
        let study = Study::new(registry, QualityAnalyzer::default());
        let results = study.run(&RunRequest::new(["prng"], 4096)).unwrap();
        state.write().await.update(results);

        let (status, body) = get_body(router(Arc::clone(&state)), "/report").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["sample_size"], 4096);
        assert_eq!(json["entries"][0]["id"], "prng");

        let (status, body) = get_body(router(Arc::clone(&state)), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("rng_study_"));

        let (status, body) = get_body(router(state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
