//! Centralized error handling.
//!
//! Provides a unified error type for the entire application. The outer
//! transport layer maps variants to its own status codes through
//! [`AppError::code`] and [`AppError::is_client_error`].

use sea_orm::DbErr;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Query composition
    #[error("Sort key '{key}' does not exist on {entity}")]
    InvalidSortKey { key: String, entity: String },

    #[error("{0}")]
    InvalidPageRequest(String),

    #[error("Invalid orderBy '{0}', expected one of: ascending, descending")]
    InvalidSortDirection(String),

    // Persistence
    #[error("Commit failed: {0}")]
    CommitFailure(#[source] DbErr),

    #[error("Database error")]
    Database(#[from] DbErr),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    // Validation
    #[error("{0}")]
    Validation(String),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidSortKey { .. } => "INVALID_SORT_KEY",
            AppError::InvalidPageRequest(_) => "INVALID_PAGE_REQUEST",
            AppError::InvalidSortDirection(_) => "INVALID_SORT_DIRECTION",
            AppError::CommitFailure(_) => "COMMIT_FAILURE",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller, not the system, is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::CommitFailure(_) | AppError::Database(_) | AppError::Internal(_)
        )
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::CommitFailure(e) => {
                tracing::error!("Commit failure: {:?}", e);
                "The changes could not be saved".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, what: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, what: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
    }
}

/// Convenience constructors
impl AppError {
    pub fn invalid_sort_key(key: impl Into<String>, entity: impl Into<String>) -> Self {
        AppError::InvalidSortKey {
            key: key.into(),
            entity: entity.into(),
        }
    }

    pub fn page_out_of_range(page: u64, total_pages: u64) -> Self {
        AppError::InvalidPageRequest(format!(
            "Requested page ({}) is greater than total pages ({})",
            page, total_pages
        ))
    }

    pub fn invalid_page(msg: impl Into<String>) -> Self {
        AppError::InvalidPageRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_out_of_range_cites_both_values() {
        let err = AppError::page_out_of_range(4, 3);
        let msg = err.to_string();

        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
        assert_eq!(err.code(), "INVALID_PAGE_REQUEST");
    }

    #[test]
    fn test_invalid_sort_key_names_key_and_entity() {
        let err = AppError::invalid_sort_key("Colour", "Activity");

        assert_eq!(err.to_string(), "Sort key 'Colour' does not exist on Activity");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_commit_failure_is_not_client_error() {
        let err = AppError::CommitFailure(DbErr::Custom("constraint".into()));

        assert!(!err.is_client_error());
        assert_eq!(err.user_message(), "The changes could not be saved");
    }

    #[test]
    fn test_ok_or_not_found() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_not_found("Activity").unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m == "Activity not found"));
    }
}
