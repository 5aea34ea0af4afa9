//! # AppError
//!
//! Centralized error handling for the client.
//! Every failure is scoped to the user action that triggered it.

use thiserror::Error;

use crate::validation::FormErrors;

/// The primary error type for all rc-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Form input rejected before anything reached the network
    #[error("validation error: {0}")]
    Validation(FormErrors),

    /// Action requires a signed-in user
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failure reported by the auth collaborator, message shown to the user
    #[error("{0}")]
    Auth(String),

    /// Transport or resolver failure from the data API
    #[error("gateway error: {0}")]
    Gateway(String),

    /// A response arrived without its data payload
    #[error("could not get {0}")]
    MissingData(&'static str),

    /// Object storage failure (upload or URL signing)
    #[error("storage error: {0}")]
    Storage(String),

    /// The action collides with one already in flight
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The message surfaced to the user in a notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// A specialized Result type for client logic.
pub type Result<T> = std::result::Result<T, AppError>;
