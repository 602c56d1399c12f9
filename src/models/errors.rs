use thiserror::Error;

/// Service-level errors that can occur in business logic
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error")]
    Network { message: String },

    #[error("{detail}")]
    Application { status: u16, detail: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Catalog item not found: {item_id}")]
    ItemNotFound { item_id: String },

    #[error("Catalog item unavailable: {item_id}")]
    ItemUnavailable { item_id: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Repository-level errors for session storage
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Item not found")]
    NotFound,

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },
}

/// Errors raised while talking to the catalog and order backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be completed or its answer could not be read
    #[error("Network error: {message}")]
    Network { message: String },

    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Application { status: u16, detail: Option<String> },
}

/// Validation errors for input data
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Field too long: {field}, max_length={max_length}, actual_length={actual_length}")]
    TooLong {
        field: String,
        max_length: usize,
        actual_length: usize,
    },

    #[error("Value out of range: {field}, min={min}, max={max}, value={value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },

    #[error("Invalid format: {field}, expected={expected}")]
    InvalidFormat { field: String, expected: String },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationError {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network {
            message: err.to_string(),
        }
    }
}

impl ServiceError {
    /// Convert a backend error, using `fallback` when the backend gave no detail
    pub fn from_client(err: ClientError, fallback: &str) -> Self {
        match err {
            ClientError::Network { message } => ServiceError::Network { message },
            ClientError::Application { status, detail } => ServiceError::Application {
                status,
                detail: detail
                    .filter(|detail| !detail.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            },
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for backend client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
