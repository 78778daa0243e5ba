//! Public API types

use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::QueryRejection;
use http::StatusCode;
use serde::Serialize;

use crate::error::{ErrorKind, FeedError};

// Errors

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

pub struct ApiError(pub FeedError);

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidParameters => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamUnavailable
        | ErrorKind::UpstreamDataInvalid
        | ErrorKind::PartialAggregateFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        if kind.is_client_error() {
            tracing::warn!("{}", self.0);
        } else {
            tracing::error!("{}", self.0);
        }

        // Internal errors may carry details that shouldn't leave the process
        let detail = match &self.0 {
            FeedError::Internal(_) => String::from("Something went wrong"),
            err => err.to_string(),
        };

        (
            status_for(kind),
            Json(ErrorResponse {
                error: kind.to_string(),
                detail,
            }),
        )
            .into_response()
    }
}

/// Enables using `?` on anything that converts into a `FeedError`,
/// including `anyhow::Error`.
impl<E> From<E> for ApiError
where
    E: Into<FeedError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Query strings that don't decode into name/value pairs, e.g. a
/// repeated name, are a caller error like any other bad parameter.
impl From<QueryRejection> for FeedError {
    fn from(rejection: QueryRejection) -> Self {
        FeedError::InvalidParameters(rejection.body_text())
    }
}

// Re-export public types from each route

pub mod events {
    pub use crate::api::routes::events::public::*;
}

pub mod integrations {
    pub use crate::api::routes::integrations::public::*;
}
