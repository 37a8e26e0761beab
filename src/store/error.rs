// src/store/error.rs

use std::fmt;

/// Failures raised by a [`DocumentStore`](super::DocumentStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique key is already taken.
    Conflict(String),

    /// Any other I/O or decoding failure.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Postgres unique violations (23505) become [`StoreError::Conflict`].
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}
