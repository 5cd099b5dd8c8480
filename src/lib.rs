//! Request-host allowlisting guard for axum applications.
//!
//! Build an [`AllowedHosts`] guard once, then either install it in front of
//! every route with [`AllowedHosts::init_app`] or wrap single handlers with
//! [`AllowedHosts::limit`] / [`check_host`].
//!
//! ```rust,no_run
//! use allowed_hosts::{AllowedHosts, DenialPolicy};
//! use axum::{routing::get, Router};
//!
//! let guard = AllowedHosts::builder()
//!     .allowed_hosts(["93.184.215.14", "api.example.com"])
//!     .on_denied(DenialPolicy::redirect("/custom-error"))
//!     .build()?;
//!
//! let app: Router = Router::new()
//!     .route("/api/greet", get(guard.limit(|| async { "hello" })))
//!     .route("/custom-error", get(|| async { "not allowed" }));
//! # Ok::<(), allowed_hosts::GuardError>(())
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use error::GuardError;
pub use guard::{
    AllowedHosts, AllowedHostsBuilder, ClientHost, Decision, DenialPolicy, DeniedRequest,
    HostSource,
};
pub use http::{check_host, Guarded, HostGuardLayer, HttpServer, PreDispatch};
pub use lifecycle::Shutdown;
