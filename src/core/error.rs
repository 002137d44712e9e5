use thiserror::Error;

use crate::core::config::ConfigError;

/// Centralized error types for the application
///
/// Business outcomes (already won, sold out, not a member) are not errors and
/// never end up here; see `giveaway::Outcome`.
///
/// # Example
///
/// ```no_run
/// use treatbot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Code file parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Startup configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// True when the error is a SQLite UNIQUE/PRIMARY KEY violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
                    && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = AppError::Validation("row 3: unknown prize 'Huge'".to_string());
        assert_eq!(err.to_string(), "Validation error: row 3: unknown prize 'Huge'");
    }

    #[test]
    fn test_unique_violation_detected() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER NOT NULL UNIQUE);").unwrap();
        conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap();

        let err: AppError = conn.execute("INSERT INTO t (id) VALUES (1)", []).unwrap_err().into();
        assert!(err.is_unique_violation());

        let other: AppError = conn.execute("INSERT INTO missing (id) VALUES (1)", []).unwrap_err().into();
        assert!(!other.is_unique_violation());
    }
}
