//! The canonical unit of calendar data produced by every source.
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider specific data attached to an event. Insertion order is
/// kept so that JSON output is stable across requests.
pub type Extra = IndexMap<String, ExtraValue>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Map(Extra),
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::String(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::String(value)
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        ExtraValue::Integer(value)
    }
}

impl ExtraValue {
    /// JSON has no NaN or infinity, so those are kept as their text.
    fn sanitized(self) -> Self {
        match self {
            ExtraValue::Float(f) if !f.is_finite() => ExtraValue::String(f.to_string()),
            ExtraValue::Map(map) => {
                ExtraValue::Map(map.into_iter().map(|(k, v)| (k, v.sanitized())).collect())
            }
            other => other,
        }
    }
}

impl From<f64> for ExtraValue {
    fn from(value: f64) -> Self {
        ExtraValue::Float(value).sanitized()
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Bool(value)
    }
}

impl From<Extra> for ExtraValue {
    fn from(value: Extra) -> Self {
        ExtraValue::Map(value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("event uid must not be empty")]
    EmptyUid,
    #[error("event {0} has an empty title")]
    EmptyTitle(String),
    #[error("event {0} ends before it starts")]
    EndBeforeStart(String),
    #[error("all-day event {0} must span exactly one date-only day")]
    InvalidAllDay(String),
    #[error("event {0} falls outside the years 0 to 9999")]
    OutOfRange(String),
}

/// One calendar occurrence.
///
/// Timestamps are naive and interpreted as UTC with second
/// resolution. All-day events always start at midnight and end at
/// midnight on the following day. Fields are private so every `Event`
/// in the pipeline has passed those checks, including ones read back
/// from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EventRecord")]
pub struct Event {
    uid: String,
    title: String,
    #[serde(with = "timestamp")]
    start: NaiveDateTime,
    #[serde(with = "timestamp")]
    end: NaiveDateTime,
    all_day: bool,
    description: String,
    location: String,
    extra: Extra,
}

impl Event {
    /// A time-bounded event. Sub-second precision is dropped.
    pub fn timed(
        uid: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, EventError> {
        let uid = normalize_newlines(uid.into());
        let title = normalize_newlines(title.into());
        check_identity(&uid, &title)?;

        let start = truncate_seconds(start);
        let end = truncate_seconds(end);
        if end < start {
            return Err(EventError::EndBeforeStart(uid));
        }
        if !in_range(start.date()) || !in_range(end.date()) {
            return Err(EventError::OutOfRange(uid));
        }

        Ok(Self::new(uid, title, start, end, false))
    }

    /// An event covering the whole of `date`.
    pub fn all_day(
        uid: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Self, EventError> {
        let uid = normalize_newlines(uid.into());
        let title = normalize_newlines(title.into());
        check_identity(&uid, &title)?;

        let next = date
            .succ_opt()
            .ok_or_else(|| EventError::InvalidAllDay(uid.clone()))?;
        if !in_range(date) || !in_range(next) {
            return Err(EventError::OutOfRange(uid));
        }
        let start = date.and_time(NaiveTime::MIN);
        let end = next.and_time(NaiveTime::MIN);

        Ok(Self::new(uid, title, start, end, true))
    }

    fn new(
        uid: String,
        title: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        all_day: bool,
    ) -> Self {
        Self {
            uid,
            title,
            start,
            end,
            all_day,
            description: String::new(),
            location: String::new(),
            extra: Extra::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_newlines(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = normalize_newlines(location.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.extra.insert(key.into(), value.into().sanitized());
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }
}

fn check_identity(uid: &str, title: &str) -> Result<(), EventError> {
    if uid.trim().is_empty() {
        return Err(EventError::EmptyUid);
    }
    if title.trim().is_empty() {
        return Err(EventError::EmptyTitle(uid.to_string()));
    }
    Ok(())
}

// Calendar documents have no carriage returns in text
fn normalize_newlines(text: String) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text
    }
}

// Four digit years only
fn in_range(date: NaiveDate) -> bool {
    (0..=9999).contains(&date.year())
}

fn truncate_seconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Wire shape of an [`Event`], validated on the way in.
#[derive(Deserialize)]
struct EventRecord {
    uid: String,
    title: String,
    #[serde(with = "timestamp")]
    start: NaiveDateTime,
    #[serde(with = "timestamp")]
    end: NaiveDateTime,
    #[serde(default)]
    all_day: bool,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    extra: Extra,
}

impl TryFrom<EventRecord> for Event {
    type Error = EventError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let event = if record.all_day {
            if record.start.time() != NaiveTime::MIN
                || record.end - record.start != TimeDelta::days(1)
            {
                return Err(EventError::InvalidAllDay(record.uid));
            }
            Event::all_day(record.uid, record.title, record.start.date())?
        } else {
            Event::timed(record.uid, record.title, record.start, record.end)?
        };

        Ok(record
            .extra
            .into_iter()
            .fold(event, |event, (key, value)| event.with_extra(key, value))
            .with_description(record.description)
            .with_location(record.location))
    }
}

/// Serde format for event timestamps: `2025-06-27T00:00:00`.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&dt.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
