//! Error types for the PHARMFLOW intake pipeline.
//!
//! All fallible operations in the workspace return `PharmResult<T>`.
//! Variants carry enough context to render a user-facing message without
//! the caller re-reading the store.

use thiserror::Error;

use crate::intake::{IntakeId, IntakeStatus};

/// The unified error type for PHARMFLOW.
#[derive(Debug, Error)]
pub enum PharmError {
    /// The identifier does not resolve to a stored intake.
    #[error("intake '{id}' not found")]
    NotFound { id: IntakeId },

    /// The requested status change is not an edge of the transition table.
    #[error("invalid transition from '{from}' to '{to}'. Allowed transitions: [{}]", join_statuses(.allowed))]
    InvalidTransition {
        from: IntakeStatus,
        to: IntakeStatus,
        allowed: Vec<IntakeStatus>,
    },

    /// A caller-supplied value is outside its accepted domain.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The stored record changed between the read and the write of one operation.
    #[error("intake '{id}' was modified concurrently; reload and retry")]
    Conflict { id: IntakeId },

    /// The backing store could not complete the operation.
    #[error("store operation failed: {reason}")]
    StoreFailed { reason: String },

    /// The activity trail could not persist an entry.
    #[error("activity write failed: {reason}")]
    ActivityWriteFailed { reason: String },

    /// The knowledge base or another configuration source is missing or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A request body failed JSON Schema validation.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },
}

fn join_statuses(statuses: &[IntakeStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience alias used throughout the PHARMFLOW crates.
pub type PharmResult<T> = Result<T, PharmError>;
