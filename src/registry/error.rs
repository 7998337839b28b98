//! Error types for link registry operations.

use thiserror::Error;

use crate::db::DbError;

/// User-facing message for a name collision.
pub const DUPLICATE_NAME_MESSAGE: &str = "This filename already exists! Choose another.";

/// Errors that can occur while creating or resolving links.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed or foreign origin URL, or an unusable short name.
    /// Raised before any store access.
    #[error("{message}")]
    Validation {
        /// Human-readable reason.
        message: String,
    },

    /// A link with this short name already exists.
    #[error("{DUPLICATE_NAME_MESSAGE}")]
    DuplicateName {
        /// The sanitized name that collided.
        short_name: String,
    },

    /// No link is registered under this short name.
    #[error("no link registered for '{short_name}'")]
    NotFound {
        /// The requested short name.
        short_name: String,
    },

    /// The backing store failed.
    #[error("link store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a duplicate-name error.
    pub fn duplicate_name(short_name: impl Into<String>) -> Self {
        Self::DuplicateName {
            short_name: short_name.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(short_name: impl Into<String>) -> Self {
        Self::NotFound {
            short_name: short_name.into(),
        }
    }
}

/// Errors raised by [`LinkStore`](super::LinkStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite query failure.
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// Connection or migration failure.
    #[error(transparent)]
    Database(#[from] DbError),
}
