//! Denial responses.
//!
//! # Responsibilities
//! - Produce the response returned in place of a denied handler
//! - Run user callbacks synchronously
//! - Surface callback failures as framework errors
//!
//! # Design Decisions
//! - Default is `403 Forbidden`, per guard instance, never global
//! - Redirects use `302 Found`
//! - A failing callback is never masked as a successful denial

use std::fmt;
use std::sync::Arc;

use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GuardError;
use crate::observability::metrics;

/// Boxed error returned by custom denial callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// User-supplied denial callback.
pub type DenialCallback = Arc<dyn Fn(&DeniedRequest) -> Result<Response, BoxError> + Send + Sync>;

/// What the denial policy knows about the rejected request.
#[derive(Debug, Clone)]
pub struct DeniedRequest {
    /// The extracted host, or `None` when nothing could be extracted.
    pub host: Option<String>,
    pub method: Method,
    pub uri: Uri,
}

/// Failure of the denial policy itself.
#[derive(Debug, Error)]
pub enum DenialError {
    #[error("on_denied callback failed: {0}")]
    Callback(#[source] BoxError),

    #[error("invalid redirect location `{0}`")]
    InvalidLocation(String),
}

impl IntoResponse for DenialError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Response produced when a request's host is not allowed.
#[derive(Clone, Default)]
pub enum DenialPolicy {
    /// `403 Forbidden`.
    #[default]
    Forbidden,
    /// Fixed status and plain-text body.
    Status { status: StatusCode, body: String },
    /// `302 Found` to `location`.
    Redirect { location: String },
    /// Caller-provided response.
    Custom(DenialCallback),
}

impl DenialPolicy {
    pub fn redirect(location: impl Into<String>) -> Self {
        DenialPolicy::Redirect {
            location: location.into(),
        }
    }

    pub fn custom<F>(callback: F) -> Self
    where
        F: Fn(&DeniedRequest) -> Result<Response, BoxError> + Send + Sync + 'static,
    {
        DenialPolicy::Custom(Arc::new(callback))
    }

    /// Reject policies that could only ever fail or answer with a success
    /// status. Custom callbacks are not inspected.
    pub fn validate(&self) -> Result<(), GuardError> {
        match self {
            DenialPolicy::Forbidden | DenialPolicy::Custom(_) => Ok(()),
            DenialPolicy::Status { status, .. } => {
                if (300..=599).contains(&status.as_u16()) {
                    Ok(())
                } else {
                    Err(GuardError::InvalidDenialStatus {
                        status: status.as_u16(),
                    })
                }
            }
            DenialPolicy::Redirect { location } => {
                if location.trim().is_empty()
                    || header::HeaderValue::from_str(location).is_err()
                {
                    Err(GuardError::InvalidRedirect {
                        location: location.clone(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn respond(&self, denied: &DeniedRequest) -> Result<Response, DenialError> {
        match self {
            DenialPolicy::Forbidden => Ok((StatusCode::FORBIDDEN, "Forbidden").into_response()),
            DenialPolicy::Status { status, body } => Ok((*status, body.clone()).into_response()),
            DenialPolicy::Redirect { location } => {
                let value = header::HeaderValue::from_str(location)
                    .map_err(|_| DenialError::InvalidLocation(location.clone()))?;
                Ok((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
            }
            DenialPolicy::Custom(callback) => callback(denied).map_err(DenialError::Callback),
        }
    }

    /// Like [`respond`](Self::respond), but turns a policy failure into a
    /// logged `500` response.
    pub(crate) fn respond_or_error(&self, denied: &DeniedRequest) -> Response {
        match self.respond(denied) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    host = ?denied.host,
                    method = %denied.method,
                    path = %denied.uri.path(),
                    error = %e,
                    "Denial policy failed"
                );
                metrics::record_denial_failure();
                e.into_response()
            }
        }
    }
}

impl fmt::Debug for DenialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialPolicy::Forbidden => f.write_str("Forbidden"),
            DenialPolicy::Status { status, body } => f
                .debug_struct("Status")
                .field("status", status)
                .field("body", body)
                .finish(),
            DenialPolicy::Redirect { location } => f
                .debug_struct("Redirect")
                .field("location", location)
                .finish(),
            DenialPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Serializable form of the non-callback policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenialConfig {
    #[default]
    Forbidden,
    Status { status: u16, body: String },
    Redirect { location: String },
}

impl DenialConfig {
    pub fn to_policy(&self) -> DenialPolicy {
        match self {
            DenialConfig::Forbidden => DenialPolicy::Forbidden,
            DenialConfig::Status { status, body } => DenialPolicy::Status {
                // Range enforced by config validation.
                status: StatusCode::from_u16(*status).unwrap_or(StatusCode::FORBIDDEN),
                body: body.clone(),
            },
            DenialConfig::Redirect { location } => DenialPolicy::redirect(location.clone()),
        }
    }
}
