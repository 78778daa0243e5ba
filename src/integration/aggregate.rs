//! Merging the events of every calendar an integration owns.
use futures::future::join_all;
use serde::Serialize;

use crate::calendar::{BoxedCalendar, CalendarError, Params};
use crate::error::FeedError;
use crate::feed::Feed;

/// A calendar that failed while the rest of the feed was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFailure {
    pub calendar: String,
    pub error: CalendarError,
}

#[derive(Serialize)]
struct FailureView<'a> {
    calendar: &'a str,
    kind: &'static str,
    message: String,
}

impl Serialize for CalendarFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let kind = FeedError::from(self.error.clone()).kind().as_str();
        FailureView {
            calendar: &self.calendar,
            kind,
            message: self.error.to_string(),
        }
        .serialize(serializer)
    }
}

/// Call every calendar with the same parameters and concatenate their
/// events in registration order.
///
/// The calendars run concurrently; `join_all` yields results in input
/// order so completion order never leaks into the feed. Failing
/// calendars are reported on the returned [`Feed`] unless `strict` is
/// set. When every calendar fails the first failure is returned.
pub async fn aggregate(
    calendars: &[BoxedCalendar],
    params: &Params,
    strict: bool,
) -> Result<Feed, FeedError> {
    let results = join_all(calendars.iter().map(|c| c.fetch_events(params))).await;

    let mut events = Vec::new();
    let mut failures = Vec::new();
    for (calendar, result) in calendars.iter().zip(results) {
        match result {
            Ok(evs) => events.extend(evs),
            Err(error) => {
                tracing::warn!("Calendar {} failed: {}", calendar.id(), error);
                failures.push(CalendarFailure {
                    calendar: calendar.id().to_string(),
                    error,
                });
            }
        }
    }

    if !calendars.is_empty() && failures.len() == calendars.len() {
        let first = failures.swap_remove(0);
        return Err(first.error.into());
    }
    if strict && !failures.is_empty() {
        return Err(FeedError::PartialAggregateFailure {
            failed: failures.into_iter().map(|f| f.calendar).collect(),
        });
    }

    Ok(Feed { events, failures })
}
