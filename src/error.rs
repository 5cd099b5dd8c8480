//! Guard construction errors.

use thiserror::Error;

/// Errors raised while building an [`AllowedHosts`](crate::AllowedHosts) guard.
///
/// All of these are configuration mistakes and are reported at startup,
/// never per request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    /// No allowed hosts were configured.
    #[error("allowed hosts must not be empty")]
    EmptyAllowlist,

    /// An allowed host entry is empty or whitespace.
    #[error("allowed host at index {index} is blank")]
    BlankHost { index: usize },

    /// No host sources were configured for extraction.
    #[error("at least one host source is required")]
    NoHostSources,

    /// A forwarded-header source was configured without any trusted proxy.
    #[error("host source `{source_name}` requires at least one trusted proxy")]
    UntrustedForwarding { source_name: &'static str },

    /// The redirect target cannot be sent as a `Location` header.
    #[error("redirect location `{location}` is not a valid header value")]
    InvalidRedirect { location: String },

    /// A fixed denial status outside 300-599.
    #[error("denial status {status} must be within 300-599")]
    InvalidDenialStatus { status: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_host_reports_index() {
        let err = GuardError::BlankHost { index: 3 };
        assert!(err.to_string().contains("index 3"));
    }

    #[test]
    fn untrusted_forwarding_names_source() {
        let err = GuardError::UntrustedForwarding {
            source_name: "forwarded_for",
        };
        assert!(err.to_string().contains("forwarded_for"));
    }
}
