//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Refuse an empty or blank allowlist at startup
//! - Validate addresses, proxies, and denial settings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::{AppConfig, GuardConfig};
use crate::guard::extractor::HostSource;
use crate::guard::DenialConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("guard.allowed_hosts must not be empty")]
    EmptyAllowedHosts,

    #[error("guard.allowed_hosts[{0}] is blank")]
    BlankAllowedHost(usize),

    #[error("guard.host_sources must not be empty")]
    EmptyHostSources,

    #[error("guard.trusted_proxies[{index}] is not an IP address: {value}")]
    InvalidTrustedProxy { index: usize, value: String },

    #[error("guard.host_sources uses `{0}` but guard.trusted_proxies is empty")]
    ForwardingWithoutProxies(&'static str),

    #[error("guard.on_denied.location `{0}` must be a path or an http(s) URL")]
    InvalidRedirect(String),

    #[error("guard.on_denied.status {0} must be within 300-599")]
    InvalidDenialStatus(u16),

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        "listener.bind_address",
        &config.listener.bind_address,
        &mut errors,
    );
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }
    validate_guard(&config.guard, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_guard(guard: &GuardConfig, errors: &mut Vec<ValidationError>) {
    if guard.allowed_hosts.is_empty() {
        errors.push(ValidationError::EmptyAllowedHosts);
    }
    for (index, host) in guard.allowed_hosts.iter().enumerate() {
        if host.trim().is_empty() {
            errors.push(ValidationError::BlankAllowedHost(index));
        }
    }

    if guard.host_sources.is_empty() {
        errors.push(ValidationError::EmptyHostSources);
    }

    for (index, proxy) in guard.trusted_proxies.iter().enumerate() {
        if proxy.trim().parse::<IpAddr>().is_err() {
            errors.push(ValidationError::InvalidTrustedProxy {
                index,
                value: proxy.clone(),
            });
        }
    }

    if guard.trusted_proxies.is_empty() {
        for source in [HostSource::ForwardedFor, HostSource::ForwardedHost] {
            if guard.host_sources.contains(&source) {
                errors.push(ValidationError::ForwardingWithoutProxies(source.name()));
            }
        }
    }

    match &guard.on_denied {
        DenialConfig::Forbidden => {}
        DenialConfig::Status { status, .. } => {
            if !(300..=599).contains(status) {
                errors.push(ValidationError::InvalidDenialStatus(*status));
            }
        }
        DenialConfig::Redirect { location } => {
            let valid = location.starts_with('/')
                || location.starts_with("http://")
                || location.starts_with("https://");
            if !valid {
                errors.push(ValidationError::InvalidRedirect(location.clone()));
            }
        }
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_allowlist_rejected() {
        let mut config = AppConfig::default();
        config.guard.allowed_hosts.clear();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::EmptyAllowedHosts]
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.guard.allowed_hosts = vec!["localhost".into(), "".into()];
        config.guard.host_sources = vec![HostSource::ForwardedFor];
        config.guard.on_denied = DenialConfig::Status {
            status: 200,
            body: "ok".into(),
        };

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BlankAllowedHost(1)));
        assert!(errors.contains(&ValidationError::ForwardingWithoutProxies("forwarded_for")));
        assert!(errors.contains(&ValidationError::InvalidDenialStatus(200)));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidAddress { field, .. } if *field == "listener.bind_address")));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_bad_trusted_proxy() {
        let mut config = AppConfig::default();
        config.guard.trusted_proxies = vec!["proxy.internal".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidTrustedProxy {
                index: 0,
                value: "proxy.internal".into()
            }]
        );
    }

    #[test]
    fn test_redirect_location_checked() {
        let mut config = AppConfig::default();
        config.guard.on_denied = DenialConfig::Redirect {
            location: "custom-error".into(),
        };
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidRedirect("custom-error".into())]
        );

        config.guard.on_denied = DenialConfig::Redirect {
            location: "/custom-error".into(),
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
