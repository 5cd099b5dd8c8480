//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Guard decisions and lifecycle events:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (decision counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; the binary installs subscribers
//! - Metrics go through the `metrics` facade, no-ops without a recorder

pub mod logging;
pub mod metrics;
