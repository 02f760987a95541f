// src/error.rs
//! Failures raised by repositories and services. Application edges (startup,
//! CLI) wrap these in `anyhow` with context; the web layer maps them to
//! status codes.

use thiserror::Error;

pub type HrResult<T> = std::result::Result<T, HrError>;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("cannot {action} a {entity} in status {from}")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        from: String,
    },

    #[error("insufficient leave balance: requested {requested} days, {available} available")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl HrError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        HrError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        HrError::NotFound { entity, id }
    }

    pub fn code(&self) -> &'static str {
        match self {
            HrError::Validation { .. } => "VALIDATION_ERROR",
            HrError::NotFound { .. } => "NOT_FOUND",
            HrError::Conflict(_) => "CONFLICT",
            HrError::InvalidTransition { .. } => "INVALID_TRANSITION",
            HrError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            HrError::Forbidden(_) => "FORBIDDEN",
            HrError::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Unique and check constraint violations become `Conflict`; everything else
/// stays a database failure.
impl From<sqlx::Error> for HrError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                || db_err.is_check_violation()
                || db_err.is_foreign_key_violation()
            {
                return HrError::Conflict(db_err.message().to_string());
            }
        }
        HrError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(HrError::validation("level", "too high").code(), "VALIDATION_ERROR");
        assert_eq!(HrError::not_found("person", 3).code(), "NOT_FOUND");
        assert_eq!(
            HrError::not_found("person", 3).to_string(),
            "person 3 not found"
        );
        assert_eq!(HrError::Conflict("dup".into()).code(), "CONFLICT");
    }

    #[test]
    fn row_not_found_stays_database_error() {
        let err: HrError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, HrError::Database(_)));
    }
}
