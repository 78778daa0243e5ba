//! Turning an ordered list of events into a subscribable document.
pub mod ics;
pub mod json;

use crate::calendar::Event;
use crate::integration::{CalendarFailure, Integration};

/// The events produced for one integration request, plus any owned
/// calendars that failed while the rest succeeded.
#[derive(Debug, Default)]
pub struct Feed {
    pub events: Vec<Event>,
    pub failures: Vec<CalendarFailure>,
}

impl Feed {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            failures: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed_calendars(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.calendar.as_str()).collect()
    }
}

/// Calendar level metadata written into the document header.
#[derive(Debug, Clone, Copy)]
pub struct CalendarMeta<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a Integration> for CalendarMeta<'a> {
    fn from(integration: &'a Integration) -> Self {
        Self {
            name: integration.name(),
            description: integration.description(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Ics,
    Json,
}

impl Format {
    pub fn from_ics_flag(ics: bool) -> Self {
        if ics { Format::Ics } else { Format::Json }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Ics => "text/calendar; charset=utf-8",
            Format::Json => "application/json",
        }
    }
}

/// Render `events` in `format`.
pub fn render(format: Format, meta: &CalendarMeta, events: &[Event]) -> anyhow::Result<String> {
    match format {
        Format::Ics => Ok(ics::render(meta, events)),
        Format::Json => json::render(events),
    }
}
