use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    PageOutOfRange,
    SizeOutOfRange,
    UnknownField,
    NotFilterable,
    ValueNotAllowed(String),
    EmptySelection,
    NotSortable,
    NotSearchable,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::PageOutOfRange => write!(f, "page must be at least 1"),
            ValidationReason::SizeOutOfRange => write!(f, "page size must be at least 1"),
            ValidationReason::UnknownField => write!(f, "no such column"),
            ValidationReason::NotFilterable => write!(f, "column is not filterable"),
            ValidationReason::ValueNotAllowed(value) => {
                write!(f, "`{value}` is not one of the declared options")
            }
            ValidationReason::EmptySelection => write!(f, "at least one value is required"),
            ValidationReason::NotSortable => write!(f, "column is not sortable"),
            ValidationReason::NotSearchable => write!(f, "no searchable columns are declared"),
        }
    }
}

/// A page request that does not fit the column registry it was built for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{field}`: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Failure to obtain a page from the remote listing endpoint.
///
/// An empty page is never an error; these only cover transport and shape
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("server rejected the request ({status_code}){}", display_message(.message))]
    ServerRejected {
        status_code: u16,
        message: Option<String>,
    },

    /// The body did not carry a usable `items`/`total` pair.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request could not be built, so nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerRejected { status_code, .. } => Some(*status_code),
            Self::Network(_) | Self::MalformedResponse(_) | Self::InvalidRequest(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403))
    }

    /// Whether a user-triggered refresh has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::ServerRejected { status_code, .. } => *status_code >= 500,
            Self::MalformedResponse(_) | Self::InvalidRequest(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Failure of a create, update or delete call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server rejected the change ({status_code}){}", display_message(.message))]
    Rejected {
        status_code: u16,
        message: Option<String>,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl MutationError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { status_code, .. } => Some(*status_code),
            Self::Network(_) | Self::MalformedResponse(_) | Self::InvalidRequest(_) => None,
        }
    }
}

impl From<reqwest::Error> for MutationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

fn display_message(message: &Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!(": {message}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_rejection_carries_status_and_message() {
        let err = FetchError::ServerRejected {
            status_code: 500,
            message: Some("database unavailable".to_string()),
        };
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(
            err.to_string(),
            "server rejected the request (500): database unavailable"
        );

        let bare = FetchError::ServerRejected {
            status_code: 404,
            message: None,
        };
        assert_eq!(bare.to_string(), "server rejected the request (404)");
    }

    #[test]
    fn retryable_kinds() {
        assert!(FetchError::Network("timeout".to_string()).is_retryable());
        assert!(FetchError::ServerRejected {
            status_code: 503,
            message: None
        }
        .is_retryable());
        assert!(!FetchError::ServerRejected {
            status_code: 404,
            message: None
        }
        .is_retryable());
        assert!(!FetchError::MalformedResponse("missing `total`".to_string()).is_retryable());
    }

    #[test]
    fn unauthorized_statuses() {
        let unauthorized = FetchError::ServerRejected {
            status_code: 401,
            message: None,
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!FetchError::Network("reset".to_string()).is_unauthorized());
    }

    #[test]
    fn validation_error_names_field() {
        let err = ValidationError::new(
            "status",
            ValidationReason::ValueNotAllowed("Archived".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "invalid `status`: `Archived` is not one of the declared options"
        );
    }
}
