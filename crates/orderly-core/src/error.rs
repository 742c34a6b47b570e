//! Error types for the orderly library.

use std::path::PathBuf;
use std::sync::LockResult;

use serde::Serialize;
use thiserror::Error;

/// Comprehensive error type for all orderly operations.
///
/// Every variant maps onto an HTTP-style status code through
/// [`OrderlyError::status_code`], so transports can translate failures
/// without inspecting messages.
#[derive(Error, Debug)]
pub enum OrderlyError {
    /// Request failed structural or semantic validation
    #[error("{field} {reason}")]
    InvalidArgument { field: String, reason: String },
    /// No live entity exists for the given ID
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: &'static str, id: String },
    /// A concurrent writer got there first, or the key already exists
    #[error("{kind} with ID {id} conflicts: {reason}")]
    Conflict {
        kind: &'static str,
        id: String,
        reason: String,
    },
    /// Broken invariants and poisoned locks
    #[error("Internal error: {message}")]
    Internal { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Transport-neutral error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Builder for creating invalid argument errors.
pub struct InvalidArgumentBuilder {
    field: String,
}

impl InvalidArgumentBuilder {
    /// Create a new builder for the given field path.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// The field was supplied where it must not be.
    pub fn disallowed(self) -> OrderlyError {
        self.with_reason("disallowed")
    }

    /// The field was missing where it must be present.
    pub fn required(self) -> OrderlyError {
        self.with_reason("required")
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> OrderlyError {
        OrderlyError::InvalidArgument {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl OrderlyError {
    /// Creates a builder for validation errors on `field`.
    pub fn invalid(field: impl Into<String>) -> InvalidArgumentBuilder {
        InvalidArgumentBuilder::new(field)
    }

    /// Creates a not-found error for an entity kind.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a conflict error for an entity kind.
    pub fn conflict(kind: &'static str, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Internal { .. }
            | Self::FileSystem { .. }
            | Self::XdgDirectory(_)
            | Self::Serialization { .. } => 500,
        }
    }

    /// Serializable `{code, message}` body.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.status_code(),
            message: self.to_string(),
        }
    }

    /// Whether the caller is at fault (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Extension trait mapping lock poisoning onto [`OrderlyError::Internal`].
pub trait LockResultExt<T> {
    /// Map a poisoned lock to an internal error naming the lock.
    fn or_poisoned(self, what: &str) -> Result<T>;
}

impl<T> LockResultExt<T> for LockResult<T> {
    fn or_poisoned(self, what: &str) -> Result<T> {
        self.map_err(|_| OrderlyError::internal(format!("{what} lock poisoned")))
    }
}

/// Result type alias for orderly operations
pub type Result<T> = std::result::Result<T, OrderlyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_message_names_field() {
        let err = OrderlyError::invalid("order.delegated_tasks.0.id").disallowed();
        assert_eq!(err.to_string(), "order.delegated_tasks.0.id disallowed");
        assert_eq!(err.status_code(), 400);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderlyError::not_found("order", "abc").status_code(), 404);
        assert_eq!(
            OrderlyError::conflict("order", "abc", "stale").status_code(),
            409
        );
        assert_eq!(OrderlyError::internal("boom").status_code(), 500);
        assert!(!OrderlyError::internal("boom").is_client_error());
    }

    #[test]
    fn test_body() {
        let body = OrderlyError::invalid("user.id").required().body();
        assert_eq!(
            body,
            ErrorBody {
                code: 400,
                message: "user.id required".to_string()
            }
        );
    }

    #[test]
    fn test_poisoned_lock_maps_to_internal() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new(0));
        let poisoner = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        match lock.lock().or_poisoned("test") {
            Err(OrderlyError::Internal { message }) => assert!(message.contains("test")),
            other => panic!("Expected Internal error, got {other:?}"),
        };
    }
}
