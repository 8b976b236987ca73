//! Application startup and lifecycle management.

use crate::config::LocationConfig;
use crate::handlers::{health_check, metrics_endpoint, near_lat_lon, near_zip};
use crate::services::{LocationStore, MongoLocationStore};
use axum::{body::Body, middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LocationStore>,
    /// Cancelled when a request hits an unrecoverable store failure.
    pub fatal: CancellationToken,
}

impl AppState {
    pub fn new(store: Arc<dyn LocationStore>) -> Self {
        Self {
            store,
            fatal: CancellationToken::new(),
        }
    }
}

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/near/zip/:zip", get(near_zip))
        .route("/near/lat/:lat/lon/:lon", get(near_lat_lon))
        .route("/metrics", get(metrics_endpoint))
        .fallback_service(ServeDir::new(static_dir))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        // Outermost so the trace span sees the request id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn shutdown_signal(fatal: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutdown signal received"),
        _ = terminate => tracing::info!("Shutdown signal received"),
        _ = fatal.cancelled() => tracing::info!("Draining after fatal store error"),
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    static_dir: String,
}

impl Application {
    /// Connect to MongoDB and bind the listener. Connection or authentication
    /// failures are returned before anything is served.
    pub async fn build(config: LocationConfig) -> Result<Self, AppError> {
        let store = MongoLocationStore::connect(&config.mongodb)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        Self::build_with_store(config, Arc::new(store)).await
    }

    /// Bind the listener around an already-open store (port 0 = random port).
    pub async fn build_with_store(
        config: LocationConfig,
        store: Arc<dyn LocationStore>,
    ) -> Result<Self, AppError> {
        let addr = config.common.bind_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Location service listening on {}:{}", addr.ip(), port);

        Ok(Self {
            port,
            listener,
            state: AppState::new(store),
            static_dir: config.static_dir,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Token cancelled by a fatal store error. Cancelling it stops the server.
    pub fn fatal_token(&self) -> CancellationToken {
        self.state.fatal.clone()
    }

    /// Serve until a signal arrives or a fatal store error cancels the token.
    /// The latter is reported as an error so the process exits non-zero.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let fatal = self.state.fatal.clone();
        let router = build_router(self.state, &self.static_dir);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal(fatal.clone()))
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })?;

        if fatal.is_cancelled() {
            return Err(std::io::Error::other("stopped after a fatal store error"));
        }

        tracing::info!("Location service stopped");
        Ok(())
    }
}
