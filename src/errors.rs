//! Unified error type for the donation tracker data layer.
//!
//! Database errors coming out of `SeaORM` are classified so that callers can
//! tell a missing record or a constraint violation apart from a broken
//! connection without inspecting driver messages themselves.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Any database error that is not one of the classified cases below
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A lookup that requires a record found none
    #[error("No {model} record found")]
    NotFound {
        /// Name of the model that was queried
        model: &'static str,
    },

    /// A unique column already holds the given value
    #[error("Unique constraint failed on {model}: {message}")]
    UniqueConstraint {
        /// Name of the model that was written
        model: &'static str,
        /// Driver message naming the violated constraint
        message: String,
    },

    /// A referenced record does not exist (or still has dependents)
    #[error("Foreign key constraint failed on {model}: {message}")]
    ForeignKeyConstraint {
        /// Name of the model that was written
        model: &'static str,
        /// Driver message naming the violated constraint
        message: String,
    },

    /// A monetary amount was zero, negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// An input failed validation before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of the problem
        message: String,
    },
}

impl Error {
    /// Classifies a `DbErr` raised while operating on `model`.
    ///
    /// Unique and foreign key violations become their own variants, everything
    /// else is kept as [`Error::Database`].
    pub fn from_db(model: &'static str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                tracing::warn!("Unique constraint violation on {model}: {message}");
                Self::UniqueConstraint { model, message }
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                tracing::warn!("Foreign key violation on {model}: {message}");
                Self::ForeignKeyConstraint { model, message }
            }
            _ => Self::Database(err),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
