//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → GuardConfig → AllowedHosts::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the guard never reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, Enforcement, GuardConfig, ListenerConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
