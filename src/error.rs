//! # Error Module
//!
//! Failure taxonomy for resolution and transaction processing. Callers match
//! on the variants: replay stops at the first error and no compensating
//! rollback is attempted, so the variant is the only signal an operator gets
//! about why a batch stopped.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the resolver, the store contract, and the five
/// transaction handlers.
#[derive(Debug, Error)]
pub enum Error {
    /// Resolution found zero matches where exactly one was required.
    #[error("{what} not found: '{name}'")]
    NotFound { what: String, name: String },

    /// Resolution found more than one match where exactly one was required.
    #[error("ambiguous {what}: {count} entities match '{name}'")]
    Ambiguous {
        what: String,
        name: String,
        count: usize,
    },

    /// More than one *active* relationship matched where at most one may
    /// exist (e.g. two ministers with the same title under one president).
    #[error("multiple active {what} relationships match '{name}'")]
    MultipleActive { what: String, name: String },

    /// A domain invariant would be violated: duplicate department name,
    /// no active relationship to terminate, malformed record or date.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// The store call itself failed (transport, serialization, server).
    #[error("store call failed: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    pub fn ambiguous(what: impl Into<String>, name: impl Into<String>, count: usize) -> Self {
        Self::Ambiguous {
            what: what.into(),
            name: name.into(),
            count,
        }
    }

    pub fn multiple_active(what: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MultipleActive {
            what: what.into(),
            name: name.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }
}
