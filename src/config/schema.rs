//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::guard::extractor::{default_sources, HostSource};
use crate::guard::DenialConfig;

/// Root configuration for the guarded application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Host allowlist and denial behaviour.
    pub guard: GuardConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// How the guard is attached to the application's routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Pre-dispatch hook over every guarded route.
    #[default]
    Global,
    /// Decorator on each guarded handler.
    PerRoute,
}

/// Host guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Hosts (IP or hostname, optionally with port) allowed through.
    pub allowed_hosts: Vec<String>,

    /// Extraction precedence, first non-empty source wins.
    pub host_sources: Vec<HostSource>,

    /// Peers whose forwarded headers are trusted.
    pub trusted_proxies: Vec<String>,

    /// Fold ASCII case before matching.
    pub case_insensitive: bool,

    /// Global hook or per-route decorator.
    pub enforcement: Enforcement,

    /// Response for denied requests.
    pub on_denied: DenialConfig,
}

impl GuardConfig {
    /// Trusted proxies that parse as IP addresses. Validation rejects the rest.
    pub fn trusted_proxy_ips(&self) -> Vec<IpAddr> {
        self.trusted_proxies
            .iter()
            .filter_map(|p| p.trim().parse().ok())
            .collect()
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: vec!["127.0.0.1:5000".to_string(), "localhost:5000".to_string()],
            host_sources: default_sources(),
            trusted_proxies: Vec::new(),
            case_insensitive: false,
            enforcement: Enforcement::Global,
            on_denied: DenialConfig::Forbidden,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
