//! Allowlist membership.
//!
//! # Design Decisions
//! - Exact, case-sensitive string match by default
//! - The port is part of the identifier and is never stripped
//! - Optional ASCII case folding, applied to both sides
//! - Empty set denies everything (fail closed)

use std::collections::HashSet;

use crate::error::GuardError;

/// Immutable set of allowed host identifiers.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    hosts: HashSet<String>,
    case_insensitive: bool,
}

impl Allowlist {
    /// Build an allowlist, rejecting blank entries.
    ///
    /// An empty collection is accepted here and denies every host; the
    /// guard constructor is where emptiness is refused.
    pub fn new<I, T>(hosts: I, case_insensitive: bool) -> Result<Self, GuardError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut set = HashSet::new();
        for (index, host) in hosts.into_iter().enumerate() {
            let host: String = host.into();
            if host.trim().is_empty() {
                return Err(GuardError::BlankHost { index });
            }
            set.insert(if case_insensitive {
                host.to_ascii_lowercase()
            } else {
                host
            });
        }

        Ok(Self {
            hosts: set,
            case_insensitive,
        })
    }

    pub fn is_allowed(&self, host: &str) -> bool {
        if self.hosts.is_empty() {
            return false;
        }
        if self.case_insensitive {
            self.hosts.contains(&host.to_ascii_lowercase())
        } else {
            self.hosts.contains(host)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }
}
