//! HTTP API server for the Jarvis gateway

pub mod chat;
pub mod health;
pub mod voice;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::dialogue::DialogueCoordinator;
use crate::voice::LocaleChain;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<DialogueCoordinator>,
    /// Locale chain for uploaded recordings; `None` when no recognizer is configured
    pub speech: Option<Arc<LocaleChain>>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    coordinator: Arc<DialogueCoordinator>,
    speech: Option<Arc<LocaleChain>>,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(coordinator: Arc<DialogueCoordinator>) -> Self {
        Self {
            coordinator,
            speech: None,
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: None,
        }
    }

    /// Enable transcription of uploaded recordings
    #[must_use]
    pub fn speech(mut self, chain: Arc<LocaleChain>) -> Self {
        self.speech = Some(chain);
        self
    }

    /// Set the bind address
    #[must_use]
    pub fn bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Serve a web client from this directory
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            coordinator: self.coordinator,
            speech: self.speech,
        });

        ApiServer {
            state,
            host: self.host,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(chat::router(self.state.clone()))
            .merge(voice::router(self.state.clone()))
            .merge(health::router());

        // Serve the web client (index.html, sw.js, manifest.json) if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
