//! The contract every data source implements.
pub mod models;
pub mod params;
pub use models::*;
pub use params::{
    ParamDefault, ParamKind, ParamSchema, ParamSpec, ParamValue, Params, RawParams, bind, invoke,
};

use async_trait::async_trait;
use thiserror::Error;

/// Failures a calendar may signal. Transport and parser errors are
/// folded into one of these kinds; the message is diagnostic detail
/// only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream data invalid: {0}")]
    UpstreamDataInvalid(String),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        // Request urls may carry provider api keys
        let err = err.without_url();
        if err.is_decode() {
            CalendarError::UpstreamDataInvalid(err.to_string())
        } else {
            CalendarError::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<EventError> for CalendarError {
    fn from(err: EventError) -> Self {
        CalendarError::UpstreamDataInvalid(err.to_string())
    }
}

/// A worker that turns bound parameters into an ordered list of events.
///
/// Implementations declare their parameters statically through
/// [`Calendar::params`]; the binder guarantees `fetch_events` only ever
/// sees exactly those names, coerced to the declared types.
#[async_trait]
pub trait Calendar: Send + Sync {
    /// Identifies this calendar when reporting aggregate failures.
    fn id(&self) -> &str;

    fn params(&self) -> &'static [ParamSpec];

    async fn fetch_events(&self, params: &Params) -> Result<Vec<Event>, CalendarError>;
}

pub type BoxedCalendar = Box<dyn Calendar + Send + Sync + 'static>;
