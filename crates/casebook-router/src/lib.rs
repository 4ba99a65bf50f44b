//! Casebook Router
//!
//! HTTP surface for the case link graph and keyword engine. Verifies bearer
//! tokens, applies the request deadline and maps service errors to status
//! codes.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod session;
pub mod views;

use casebook_gatekeeper::{AccessGate, CaseMembershipGate};
use casebook_service::Services;
use casebook_store::{DocumentStore, MemoryStore, SqliteStore, StoreError};
use config::{ConfigError, RouterConfig, StoreBackend};
use handlers::{create_router, AppState};
use session::SessionManager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store could not be opened
    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),

    /// Token could not be issued
    #[error("Failed to issue token: {0}")]
    Session(#[from] session::SessionError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured `log_level`. Calling this twice is a
/// no-op.
pub fn init_tracing(config: &RouterConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Open the configured document store
pub fn open_store(config: &RouterConfig) -> Result<Arc<dyn DocumentStore>, RouterError> {
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => {
            let path = config
                .store
                .path
                .as_deref()
                .ok_or_else(|| ConfigError::MissingField("store.path".to_string()))?;
            Arc::new(SqliteStore::new(path)?)
        }
    };
    Ok(store)
}

/// Wire services, gate and session manager for `store`
pub fn build_state(config: &RouterConfig, store: Arc<dyn DocumentStore>) -> AppState {
    let gate: Arc<dyn AccessGate> = Arc::new(CaseMembershipGate::new(
        Arc::clone(&store),
        config.access.clone(),
    ));

    AppState {
        services: Services::new(store, gate, config.retry.clone()),
        session_manager: Arc::new(SessionManager::new(
            &config.jwt_secret,
            config.token_expiry_secs,
        )),
        request_timeout: config.request_timeout(),
    }
}

/// Issue a bearer token for `email`, signed with the configured secret
pub fn issue_token(config: &RouterConfig, email: &str) -> Result<String, RouterError> {
    let manager = SessionManager::new(&config.jwt_secret, config.token_expiry_secs);
    Ok(manager.generate_token(email)?)
}

/// Start the Router HTTP server
///
/// Opens the store, wires the services and serves until Ctrl+C.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    init_tracing(&config);

    info!("Starting Casebook Router");
    info!("Bind address: {}", config.bind_addr());
    info!("Store backend: {:?}", config.store.backend);
    info!("Request timeout: {} ms", config.request_timeout_ms);

    let store = open_store(&config)?;
    let app = create_router(build_state(&config, store));

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
