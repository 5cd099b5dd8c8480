//! Host allowlisting guard.
//!
//! # Data Flow
//! ```text
//! Incoming request (Host header, forwarded headers, peer address)
//!     → extractor.rs (pick one host identifier by fixed precedence)
//!     → matcher.rs (exact membership in the allowlist)
//!     → Allowed: attach ClientHost, run the handler
//!     → Denied:  denial.rs (forbidden / status / redirect / callback)
//! ```
//!
//! # Design Decisions
//! - Built once per application, immutable afterwards
//! - Shared via Arc; no locks on the request path
//! - Fail closed: no host, or empty allowlist, means deny
//! - Middleware and decorator share one check-then-branch routine

pub mod denial;
pub mod extractor;
pub mod matcher;

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::observability::metrics;

pub use denial::{BoxError, DenialConfig, DenialError, DenialPolicy, DeniedRequest};
pub use extractor::{HostExtractor, HostSource};
pub use matcher::Allowlist;

/// Outcome of checking one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed { host: String },
    Denied { host: Option<String> },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Host of an admitted request, attached to its extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHost(pub String);

struct Inner {
    allowlist: Allowlist,
    extractor: HostExtractor,
    on_denied: DenialPolicy,
}

/// The application-wide guard.
///
/// Cheap to clone; every clone shares the same immutable configuration.
#[derive(Clone)]
pub struct AllowedHosts {
    inner: Arc<Inner>,
}

impl AllowedHosts {
    /// Guard with the default extractor and a `403 Forbidden` denial.
    pub fn new<I, T>(allowed_hosts: I) -> Result<Self, GuardError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::builder().allowed_hosts(allowed_hosts).build()
    }

    pub fn builder() -> AllowedHostsBuilder {
        AllowedHostsBuilder::default()
    }

    pub fn from_config(config: &GuardConfig) -> Result<Self, GuardError> {
        Self::builder()
            .allowed_hosts(config.allowed_hosts.iter().cloned())
            .host_sources(config.host_sources.clone())
            .trusted_proxies(config.trusted_proxy_ips())
            .case_insensitive(config.case_insensitive)
            .on_denied(config.on_denied.to_policy())
            .build()
    }

    /// Decide whether a request may proceed. Pure: no logging, no response.
    pub fn decide<B>(&self, req: &Request<B>) -> Decision {
        match self.inner.extractor.extract(req) {
            Some(host) if self.inner.allowlist.is_allowed(&host) => Decision::Allowed { host },
            host => Decision::Denied { host },
        }
    }

    /// Run the check and either admit the request or produce the denial
    /// response that replaces the handler's.
    pub(crate) fn admit<B>(&self, req: &mut Request<B>) -> Result<(), Response> {
        match self.decide(req) {
            Decision::Allowed { host } => {
                tracing::debug!(host = %host, path = %req.uri().path(), "Host allowed");
                metrics::record_decision(true);
                req.extensions_mut().insert(ClientHost(host));
                Ok(())
            }
            Decision::Denied { host } => {
                match &host {
                    Some(host) => tracing::warn!(
                        host = %host,
                        method = %req.method(),
                        path = %req.uri().path(),
                        "Host not in allowlist, denying request"
                    ),
                    None => tracing::warn!(
                        method = %req.method(),
                        path = %req.uri().path(),
                        "No host could be extracted, denying request"
                    ),
                }
                metrics::record_decision(false);

                let denied = DeniedRequest {
                    host,
                    method: req.method().clone(),
                    uri: req.uri().clone(),
                };
                Err(self.inner.on_denied.respond_or_error(&denied))
            }
        }
    }

    /// Apply the denial policy directly.
    pub fn on_denied(&self, denied: &DeniedRequest) -> Result<Response, DenialError> {
        self.inner.on_denied.respond(denied)
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.inner.allowlist
    }
}

impl std::fmt::Debug for AllowedHosts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllowedHosts")
            .field("allowlist", &self.inner.allowlist)
            .field("extractor", &self.inner.extractor)
            .field("on_denied", &self.inner.on_denied)
            .finish()
    }
}

/// Builder for [`AllowedHosts`].
#[derive(Debug, Default)]
pub struct AllowedHostsBuilder {
    allowed_hosts: Vec<String>,
    host_sources: Option<Vec<HostSource>>,
    trusted_proxies: Vec<IpAddr>,
    case_insensitive: bool,
    on_denied: DenialPolicy,
}

impl AllowedHostsBuilder {
    pub fn allowed_hosts<I, T>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.allowed_hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Extraction precedence; defaults to `Host` header then peer IP.
    pub fn host_sources(mut self, sources: Vec<HostSource>) -> Self {
        self.host_sources = Some(sources);
        self
    }

    pub fn trusted_proxies(mut self, proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        self.trusted_proxies.extend(proxies);
        self
    }

    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    pub fn on_denied(mut self, policy: DenialPolicy) -> Self {
        self.on_denied = policy;
        self
    }

    /// Shorthand for a [`DenialPolicy::Custom`] callback.
    pub fn on_denied_fn<F, R>(self, callback: F) -> Self
    where
        F: Fn(&DeniedRequest) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.on_denied(DenialPolicy::custom(move |req| Ok(callback(req).into_response())))
    }

    pub fn build(self) -> Result<AllowedHosts, GuardError> {
        if self.allowed_hosts.is_empty() {
            return Err(GuardError::EmptyAllowlist);
        }
        let allowlist = Allowlist::new(self.allowed_hosts, self.case_insensitive)?;
        let extractor = HostExtractor::new(
            self.host_sources.unwrap_or_else(extractor::default_sources),
            self.trusted_proxies,
        )?;
        self.on_denied.validate()?;

        tracing::debug!(
            hosts = allowlist.len(),
            sources = ?extractor.sources(),
            "Host guard configured"
        );

        Ok(AllowedHosts {
            inner: Arc::new(Inner {
                allowlist,
                extractor,
                on_denied: self.on_denied,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};

    fn with_host(host: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/greet")
            .header("Host", host)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_decide_allowed_and_denied() {
        let guard = AllowedHosts::new(["127.0.0.1:5000", "localhost:5000"]).unwrap();

        assert_eq!(
            guard.decide(&with_host("localhost:5000")),
            Decision::Allowed {
                host: "localhost:5000".into()
            }
        );
        assert_eq!(
            guard.decide(&with_host("evil.com")),
            Decision::Denied {
                host: Some("evil.com".into())
            }
        );
    }

    #[test]
    fn test_missing_host_is_denied() {
        let guard = AllowedHosts::new(["localhost:5000"]).unwrap();
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(guard.decide(&req), Decision::Denied { host: None });
    }

    #[test]
    fn test_empty_allowlist_fails_fast() {
        let err = AllowedHosts::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, GuardError::EmptyAllowlist);
    }

    #[test]
    fn test_admit_attaches_client_host() {
        let guard = AllowedHosts::new(["api.example.com"]).unwrap();
        let mut req = with_host("api.example.com");
        assert!(guard.admit(&mut req).is_ok());
        assert_eq!(
            req.extensions().get::<ClientHost>(),
            Some(&ClientHost("api.example.com".into()))
        );
    }

    #[test]
    fn test_admit_returns_denial_response() {
        let guard = AllowedHosts::builder()
            .allowed_hosts(["93.184.215.14", "api.example.com"])
            .on_denied(DenialPolicy::redirect("/custom-error"))
            .build()
            .unwrap();

        let response = guard.admit(&mut with_host("10.0.0.1")).unwrap_err();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/custom-error");
    }

    #[test]
    fn test_build_rejects_unusable_redirect() {
        let err = AllowedHosts::builder()
            .allowed_hosts(["api.example.com"])
            .on_denied(DenialPolicy::redirect("/custom-error\r\nSet-Cookie: x=1"))
            .build()
            .unwrap_err();
        assert!(matches!(err, GuardError::InvalidRedirect { .. }));
    }

    #[test]
    fn test_build_rejects_success_denial_status() {
        let err = AllowedHosts::builder()
            .allowed_hosts(["api.example.com"])
            .on_denied(DenialPolicy::Status {
                status: StatusCode::OK,
                body: "ok".into(),
            })
            .build()
            .unwrap_err();
        assert_eq!(err, GuardError::InvalidDenialStatus { status: 200 });
    }

    #[test]
    fn test_on_denied_applies_policy_directly() {
        let guard = AllowedHosts::builder()
            .allowed_hosts(["api.example.com"])
            .on_denied(DenialPolicy::redirect("/custom-error"))
            .build()
            .unwrap();
        let denied = DeniedRequest {
            host: Some("10.0.0.1".into()),
            method: axum::http::Method::GET,
            uri: axum::http::Uri::from_static("/api/greet"),
        };

        let response = guard.on_denied(&denied).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/custom-error");

        let default_guard = AllowedHosts::new(["api.example.com"]).unwrap();
        let response = default_guard.on_denied(&denied).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_on_denied_fn_wraps_into_response() {
        let guard = AllowedHosts::builder()
            .allowed_hosts(["localhost"])
            .on_denied_fn(|_| (StatusCode::NOT_FOUND, "nothing here"))
            .build()
            .unwrap();

        let response = guard.admit(&mut with_host("evil.com")).unwrap_err();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_guard_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone + 'static>() {}
        assert_send_sync::<AllowedHosts>();
    }
}
