use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

use crate::status::PollStatus;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Resource not found")]
    NotFound,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Operation not authorized")]
    Unauthorized,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Poll is not active")]
    PollNotActive,
    #[error("Backend unavailable")]
    BackendUnavailable,
    #[error("Validation failed")]
    ValidationFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a [`PollStore`](crate::store::PollStore).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Unique constraint violated")]
    UniqueViolation,
    #[error("Referenced record does not exist")]
    InvalidReference,
    #[error("Backend call timed out")]
    Timeout,
    #[error("Backend error: {0}")]
    Unavailable(String),
}

/// Outcome taxonomy of every poll, vote and results operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VoteError {
    #[error("You have already voted on this poll")]
    AlreadyVoted,
    #[error("Poll is {0}, voting is closed")]
    PollNotActive(PollStatus),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Poll not found")]
    NotFound,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Not allowed to access this poll")]
    NotAuthorized,
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl VoteError {
    /// Transient failures the user may retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VoteError::BackendUnavailable(_))
    }
}

impl From<StoreError> for VoteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => VoteError::AlreadyVoted,
            StoreError::InvalidReference => VoteError::Validation(ValidationError::UnknownOption),
            StoreError::Timeout => VoteError::BackendUnavailable("request timed out".into()),
            StoreError::Unavailable(reason) => VoteError::BackendUnavailable(reason),
        }
    }
}

impl From<VoteError> for Error {
    fn from(err: VoteError) -> Self {
        let code = match &err {
            VoteError::AlreadyVoted => ErrorCode::AlreadyVoted,
            VoteError::PollNotActive(_) => ErrorCode::PollNotActive,
            VoteError::Validation(_) => ErrorCode::ValidationFailed,
            VoteError::NotFound => ErrorCode::NotFound,
            VoteError::Unauthenticated => ErrorCode::Unauthenticated,
            VoteError::NotAuthorized => ErrorCode::Unauthorized,
            VoteError::BackendUnavailable(_) => ErrorCode::BackendUnavailable,
        };
        match err {
            VoteError::BackendUnavailable(reason) => {
                Error::with_details(code, "The service is temporarily unavailable, please retry", reason)
            }
            other => Error::new(code, other.to_string()),
        }
    }
}
