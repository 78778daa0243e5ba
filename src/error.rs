//! Errors surfaced by a feed request.
use std::fmt;

use thiserror::Error;

use crate::calendar::CalendarError;

/// Coarse classification used for logging and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameters,
    UpstreamUnavailable,
    UpstreamDataInvalid,
    PartialAggregateFailure,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParameters => "invalid_parameters",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::UpstreamDataInvalid => "upstream_data_invalid",
            Self::PartialAggregateFailure => "partial_aggregate_failure",
            Self::InternalError => "internal_error",
        }
    }

    /// Caller errors as opposed to server side failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParameters)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream data invalid: {0}")]
    UpstreamDataInvalid(String),
    /// Only raised as a hard error when aggregation is strict.
    #[error("calendars failed: {}", .failed.join(", "))]
    PartialAggregateFailure { failed: Vec<String> },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::UpstreamDataInvalid(_) => ErrorKind::UpstreamDataInvalid,
            Self::PartialAggregateFailure { .. } => ErrorKind::PartialAggregateFailure,
            Self::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<CalendarError> for FeedError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::UpstreamUnavailable(msg) => FeedError::UpstreamUnavailable(msg),
            CalendarError::UpstreamDataInvalid(msg) => FeedError::UpstreamDataInvalid(msg),
            CalendarError::InvalidParameters(msg) => FeedError::InvalidParameters(msg),
        }
    }
}
