//! JSON rendering of a feed: an ordered array of event objects.
use anyhow::Result;

use crate::calendar::Event;

pub fn render(events: &[Event]) -> Result<String> {
    Ok(serde_json::to_string_pretty(events)?)
}

pub fn parse(doc: &str) -> Result<Vec<Event>> {
    Ok(serde_json::from_str(doc)?)
}
