//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! axum Router
//!     → middleware.rs (HostGuardLayer via PreDispatch, all matched routes)
//!       or decorator.rs (Guarded<H>, one handler)
//!     → guard::AllowedHosts::admit
//!     → handler, or denial response
//!
//! server.rs wires both into the runnable application.
//! ```

pub mod decorator;
pub mod middleware;
pub mod server;

pub use decorator::{check_host, Guarded};
pub use middleware::{HostGuardLayer, HostGuardService, PreDispatch};
pub use server::HttpServer;
