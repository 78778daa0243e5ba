//! Test utilities for integration tests
#![allow(dead_code)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body};
use chrono::NaiveDate;

use calfeed::api::{AppState, app};
use calfeed::calendar::{
    Calendar, CalendarError, Event, ParamDefault, ParamKind, ParamSpec, Params,
};
use calfeed::integration::{Integration, Registry};

pub const IMDB_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("country", ParamKind::String)
        .with_description("Release country, e.g. US"),
    ParamSpec::required("genre", ParamKind::String),
    ParamSpec::optional("actor", ParamDefault::String("")),
    ParamSpec::optional("limit", ParamDefault::Integer(10)),
];

pub const NO_PARAMS: &[ParamSpec] = &[];

/// A calendar with a canned outcome that records every call.
pub struct StubCalendar {
    id: &'static str,
    params: &'static [ParamSpec],
    outcome: Result<Vec<Event>, CalendarError>,
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
    pub seen: Arc<Mutex<Vec<Params>>>,
}

impl StubCalendar {
    pub fn new(id: &'static str, params: &'static [ParamSpec], events: Vec<Event>) -> Self {
        Self {
            id,
            params,
            outcome: Ok(events),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(id: &'static str, params: &'static [ParamSpec], error: CalendarError) -> Self {
        Self {
            outcome: Err(error),
            ..Self::new(id, params, vec![])
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Calendar for StubCalendar {
    fn id(&self) -> &str {
        self.id
    }

    fn params(&self) -> &'static [ParamSpec] {
        self.params
    }

    async fn fetch_events(&self, params: &Params) -> Result<Vec<Event>, CalendarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(params.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn some_movie() -> Event {
    Event::all_day("imdb-tt0000001", "Some Movie", day(2025, 6, 27)).unwrap()
}

pub fn wrestling_show(uid: &str, title: &str) -> Event {
    let start = day(2025, 7, 4).and_hms_opt(0, 0, 0).unwrap();
    let end = day(2025, 7, 4).and_hms_opt(3, 0, 0).unwrap();
    Event::timed(uid, title, start, end).unwrap()
}

/// Wrap a registry in the application router.
pub fn app_with(registry: Registry) -> Router {
    app(Arc::new(AppState::new(registry)))
}

/// Creates a test application router with a fixed set of stub
/// integrations:
///
/// - `imdb`: one calendar returning "Some Movie" on 2025-06-27
/// - `wwe`: `raw` succeeds, `smackdown` is down
/// - `twitch`: every calendar is down
/// - `strict`: like `wwe` but aggregation is strict
/// - `google_sheets`: one empty calendar
pub fn test_app() -> Router {
    app_with(test_registry())
}

pub fn test_registry() -> Registry {
    let mut registry = Registry::new();

    registry
        .register(
            Integration::builder("imdb", "IMDb")
                .description("Upcoming movie releases")
                .base_url("https://www.imdb.com")
                .calendar(Box::new(StubCalendar::new(
                    "releases",
                    IMDB_PARAMS,
                    vec![some_movie()],
                )))
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            Integration::builder("wwe", "WWE")
                .calendar(Box::new(StubCalendar::new(
                    "raw",
                    NO_PARAMS,
                    vec![wrestling_show("wwe-raw-1", "Monday Night Raw")],
                )))
                .calendar(Box::new(StubCalendar::failing(
                    "smackdown",
                    NO_PARAMS,
                    CalendarError::UpstreamUnavailable("connection refused".into()),
                )))
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            Integration::builder("twitch", "Twitch")
                .calendar(Box::new(StubCalendar::failing(
                    "streams",
                    NO_PARAMS,
                    CalendarError::UpstreamDataInvalid("unexpected payload".into()),
                )))
                .calendar(Box::new(StubCalendar::failing(
                    "vods",
                    NO_PARAMS,
                    CalendarError::UpstreamUnavailable("timed out".into()),
                )))
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            Integration::builder("strict", "Strict")
                .strict(true)
                .calendar(Box::new(StubCalendar::new(
                    "ok",
                    NO_PARAMS,
                    vec![wrestling_show("strict-1", "Show")],
                )))
                .calendar(Box::new(StubCalendar::failing(
                    "down",
                    NO_PARAMS,
                    CalendarError::UpstreamUnavailable("connection refused".into()),
                )))
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
        .register(
            Integration::builder("google_sheets", "Google Sheets")
                .calendar(Box::new(StubCalendar::new("sheet", NO_PARAMS, vec![])))
                .build()
                .unwrap(),
        )
        .unwrap();

    registry
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
