//! Mirror Server
//!
//! Mirrors a slice of a remote user/post/comment dataset into a local
//! document store and serves CRUD-style endpoints over it.
//!
//! Uses SQLite (embedded) by default; an in-memory store is available for
//! throwaway runs.

mod error;
mod handlers;
mod routes;
mod services;
mod settings;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use mirror_core::DocumentStore;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::{ServerConfig, StoreBackend};
use services::{DatasetService, HttpSeedSource};
use storage::{MemoryStore, SqliteStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<DatasetService>,
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = panic_message(info.payload());
        eprintln!("[PANIC] {}: {}", location, message);
        error!(%location, "panic: {}", message);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Mirror Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Text carried by a panic payload (`panic!` yields `&str` or `String`)
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

async fn run_server() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, store={:?}, user_limit={}",
        config.bind_address, config.store, config.user_limit
    );

    let store = open_store(&config).await?;
    let seed = Arc::new(HttpSeedSource::new(config.seed_base_url.clone()));
    info!("Seed source: {}", seed.base_url());

    let state = AppState {
        dataset: Arc::new(DatasetService::new(store.clone(), seed, config.user_limit)),
    };
    let app = routes::build_router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server is running at http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    store.close().await;
    info!("Server stopped");
    served
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store {
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&config.database_path)
                .await
                .context("Failed to initialize database")?;
            info!("SQLite store ready at: {}", config.database_path);
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let literal: Box<dyn Any + Send> = Box::new("store exploded");
        assert_eq!(panic_message(literal.as_ref()), "store exploded");

        let formatted: Box<dyn Any + Send> = Box::new(format!("user {} vanished", 3));
        assert_eq!(panic_message(formatted.as_ref()), "user 3 vanished");

        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_panic_message_from_caught_panic() {
        let payload = std::panic::catch_unwind(|| panic!("seed {} missing", "users")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "seed users missing");
    }
}
