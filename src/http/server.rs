//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the guarded application router from config
//! - Attach the guard as a global hook or per-route decorator
//! - Serve with peer addresses available to the guard
//! - Stop gracefully on shutdown

use std::net::SocketAddr;

use axum::{
    extract::Query,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, Enforcement};
use crate::error::GuardError;
use crate::guard::AllowedHosts;
use crate::lifecycle::shutdown;

pub const CUSTOM_ERROR_MESSAGE: &str = "Oops! looks like you are not allowed to access this page!";

#[derive(Debug, Deserialize)]
pub struct GreetParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Greeting {
    pub greeting: String,
}

/// HTTP server for the guarded application.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new server; fails if the guard configuration is unusable.
    pub fn new(config: AppConfig) -> Result<Self, GuardError> {
        let guard = AllowedHosts::from_config(&config.guard)?;
        let router = Self::build_router(&config, &guard);
        Ok(Self { router, config })
    }

    /// Build the router. `/api/*` is guarded; `/custom-error` and `/health`
    /// never are, so a redirect denial cannot loop.
    pub fn build_router(config: &AppConfig, guard: &AllowedHosts) -> Router {
        let api = match config.guard.enforcement {
            Enforcement::Global => guard.init_app(Router::new().route("/api/greet", get(greet))),
            Enforcement::PerRoute => Router::new().route("/api/greet", get(guard.limit(greet))),
        };

        api.route("/custom-error", get(custom_error))
            .route("/health", get(health))
            .layer(TraceLayer::new_for_http())
    }

    /// The application router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            enforcement = ?self.config.guard.enforcement,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn greet(Query(params): Query<GreetParams>) -> Json<Greeting> {
    let name = params.name.unwrap_or_else(|| "Friend".to_string());
    Json(Greeting {
        greeting: format!("Hello There {name}!"),
    })
}

async fn custom_error() -> &'static str {
    CUSTOM_ERROR_MESSAGE
}

async fn health() -> &'static str {
    "ok"
}
