//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the routing and detection clients from config
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve until the shutdown coordinator fires

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RefinerConfig;
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::refinement::{RefinementEngine, SessionStore};
use crate::services::{DetectionBackend, DetectionFailure, OpenRouteClient, RouteError};

/// Engine as wired by the server.
pub type Engine = RefinementEngine<OpenRouteClient, DetectionBackend>;

/// Errors building the server's service clients.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("routing service: {0}")]
    Routing(#[from] RouteError),

    #[error("obstacle detector: {0}")]
    Detection(#[from] DetectionFailure),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub sessions: SessionStore,
}

/// HTTP server for the refinement API.
pub struct HttpServer {
    router: Router,
    config: RefinerConfig,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Refinement sessions stop between iterations once `shutdown` fires.
    pub fn new(config: RefinerConfig, shutdown: Shutdown) -> Result<Self, StartupError> {
        let routing = OpenRouteClient::from_config(&config.routing)?;
        let detector = DetectionBackend::from_config(&config.detection)?;
        tracing::info!(
            routing = %config.routing.base_url,
            detector = detector.name(),
            max_attempts = config.refinement.max_attempts,
            session_deadline_secs = config.refinement.session_deadline_secs,
            "Services initialized"
        );

        let engine = RefinementEngine::new(routing, detector, config.refinement.clone())
            .with_shutdown(shutdown.clone());
        let state = AppState {
            engine: Arc::new(engine),
            sessions: SessionStore::new(config.sessions.capacity),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            shutdown,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `POST /api/refine` sits outside the request timeout; sessions are
    /// bounded by `refinement.session_deadline_secs` instead.
    #[allow(deprecated)]
    fn build_router(config: &RefinerConfig, state: AppState) -> Router {
        let bounded = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/route", post(handlers::route))
            .route("/api/analyze", post(handlers::analyze))
            .route("/api/survey", post(handlers::survey))
            .route("/api/refine/{id}", get(handlers::get_session))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .route("/api/refine", post(handlers::refine))
            .merge(bounded)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RefinerConfig {
        &self.config
    }
}
