//! Host extraction.
//!
//! # Responsibilities
//! - Derive one host identifier from a request
//! - Apply a fixed, ordered precedence of host sources
//! - Honour forwarded headers only from trusted proxies
//!
//! # Design Decisions
//! - First source yielding a non-empty value wins
//! - Forwarded headers from an untrusted peer are skipped, not rejected
//! - Peer address is reported as a bare IP (no port)
//! - Pure read: never mutates the request

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request};
use serde::{Deserialize, Serialize};

use crate::error::GuardError;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// A request signal the host identifier can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSource {
    /// `Host` header, falling back to the URI authority (HTTP/2).
    HostHeader,
    /// First entry of `X-Forwarded-Host`, trusted proxies only.
    ForwardedHost,
    /// Leftmost entry of `X-Forwarded-For`, trusted proxies only.
    ForwardedFor,
    /// IP of the TCP peer.
    PeerAddr,
}

impl HostSource {
    pub fn name(self) -> &'static str {
        match self {
            HostSource::HostHeader => "host_header",
            HostSource::ForwardedHost => "forwarded_host",
            HostSource::ForwardedFor => "forwarded_for",
            HostSource::PeerAddr => "peer_addr",
        }
    }

    fn is_forwarded(self) -> bool {
        matches!(self, HostSource::ForwardedHost | HostSource::ForwardedFor)
    }
}

/// Default precedence: `Host` header, then the peer IP.
pub fn default_sources() -> Vec<HostSource> {
    vec![HostSource::HostHeader, HostSource::PeerAddr]
}

/// Extracts the canonical host string from a request.
#[derive(Debug, Clone)]
pub struct HostExtractor {
    sources: Vec<HostSource>,
    trusted_proxies: HashSet<IpAddr>,
}

impl HostExtractor {
    pub fn new(
        sources: Vec<HostSource>,
        trusted_proxies: impl IntoIterator<Item = IpAddr>,
    ) -> Result<Self, GuardError> {
        if sources.is_empty() {
            return Err(GuardError::NoHostSources);
        }

        let trusted_proxies: HashSet<IpAddr> = trusted_proxies.into_iter().collect();
        if trusted_proxies.is_empty() {
            if let Some(source) = sources.iter().find(|s| s.is_forwarded()) {
                return Err(GuardError::UntrustedForwarding {
                    source_name: source.name(),
                });
            }
        }

        Ok(Self {
            sources,
            trusted_proxies,
        })
    }

    pub fn sources(&self) -> &[HostSource] {
        &self.sources
    }

    /// Returns the first host identifier the configured sources yield.
    pub fn extract<B>(&self, req: &Request<B>) -> Option<String> {
        let peer = peer_ip(req);
        self.sources
            .iter()
            .find_map(|source| self.read_source(*source, req, peer))
    }

    fn read_source<B>(
        &self,
        source: HostSource,
        req: &Request<B>,
        peer: Option<IpAddr>,
    ) -> Option<String> {
        match source {
            HostSource::HostHeader => header_value(req.headers(), header::HOST.as_str())
                .filter(|h| !h.is_empty())
                .or_else(|| req.uri().authority().map(|a| a.as_str().to_string())),
            HostSource::ForwardedHost if self.is_trusted(peer) => {
                first_entry(req.headers(), X_FORWARDED_HOST)
            }
            HostSource::ForwardedFor if self.is_trusted(peer) => {
                first_entry(req.headers(), X_FORWARDED_FOR)
            }
            HostSource::ForwardedHost | HostSource::ForwardedFor => {
                if req.headers().contains_key(X_FORWARDED_FOR)
                    || req.headers().contains_key(X_FORWARDED_HOST)
                {
                    tracing::debug!(peer = ?peer, source = source.name(), "Ignoring forwarded header from untrusted peer");
                }
                None
            }
            HostSource::PeerAddr => peer.map(|ip| ip.to_string()),
        }
    }

    fn is_trusted(&self, peer: Option<IpAddr>) -> bool {
        peer.is_some_and(|ip| self.trusted_proxies.contains(&ip))
    }
}

impl Default for HostExtractor {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            trusted_proxies: HashSet::new(),
        }
    }
}

fn peer_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

fn first_entry(headers: &HeaderMap, name: &str) -> Option<String> {
    header_value(headers, name)
        .and_then(|v| v.split(',').next().map(|e| e.trim().to_string()))
        .filter(|e| !e.is_empty())
}
