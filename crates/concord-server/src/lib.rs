//! Concord Server
//!
//! HTTP surface for the consolidation service. Exposes `POST /consolidate`
//! for batch consolidation, `GET /clear` for dropping reputation data, and
//! `GET /health` for liveness.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use concord_store::MemoryStore;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the consolidation HTTP server
///
/// Initializes tracing, wires the shared store into the application state,
/// and serves the axum router.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Concord server");
    info!("Bind address: {}", config.bind_addr());
    info!(
        "Engine parameters: k={} lf={} dampening={} influence={} stateful={}",
        config.levels, config.longevity_factor, config.dampening, config.influence, config.stateful
    );

    // The store is the only resource shared across requests
    let store = Arc::new(MemoryStore::new());

    let state = AppState {
        config: config.clone(),
        store,
    };

    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.levels, 10);
        assert!(!config.stateful);
    }
}
