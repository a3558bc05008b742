//! HTTP prediction service
//!
//! Serves `GET /`, `POST /predict` and `GET /metrics` from the model and
//! scaler artifacts loaded once at startup.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::artifacts::ArtifactStore;
use crate::inference::PredictionService;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifacts_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            artifacts_dir: std::env::var("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("artifacts")),
        }
    }
}

/// Load artifacts and build the shared state; fails if either file is unusable
pub fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let store = ArtifactStore::new(&config.artifacts_dir);
    let pair = store
        .load()
        .with_context(|| format!("Failed to load artifacts from {}", store.dir().display()))?;
    let predictor = PredictionService::from_artifacts(pair);
    info!(
        model = predictor.model_label(),
        artifacts_dir = %store.dir().display(),
        "Model and scaler loaded"
    );
    Ok(Arc::new(AppState::new(predictor)))
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    let state = build_state(&config)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        started_at = %start_time.to_rfc3339(),
        "Heart disease prediction API starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install ctrl+c handler");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        if std::env::var("API_PORT").is_err() {
            assert_eq!(config.port, 8000);
        }
        if std::env::var("ARTIFACTS_DIR").is_err() {
            assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
        }
    }

    #[test]
    fn test_build_state_fails_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            artifacts_dir: dir.path().to_path_buf(),
        };
        let err = build_state(&config).err().unwrap();
        assert!(err.to_string().contains("Failed to load artifacts"));
    }
}
