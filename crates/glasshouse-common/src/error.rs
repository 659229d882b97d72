//! Common error types for Glasshouse components.

use thiserror::Error;

/// Common errors across Glasshouse components
#[derive(Debug, Error)]
pub enum GlasshouseError {
    /// Database connection/operation error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing error
    #[error("Password digest error: {0}")]
    PasswordHash(String),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),
}

impl GlasshouseError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Database(_) => 503,
            Self::PasswordHash(_) => 500,
            Self::Template(_) => 500,
        }
    }

    /// Returns true if this is a unique-constraint violation from the store
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(e) => e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation()),
            _ => false,
        }
    }
}
