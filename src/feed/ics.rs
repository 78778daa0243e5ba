//! iCalendar (RFC 5545) rendering of a feed, and a reader for the
//! documents it produces.
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike,
};
use thiserror::Error;

use super::CalendarMeta;
use crate::calendar::{Event, EventError};

pub const PRODID: &str = "-//calfeed//Calendar Feed//EN";
const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const MAX_LINE_OCTETS: usize = 75;

/// Render `events` as a calendar document stamped with the current time.
pub fn render(meta: &CalendarMeta, events: &[Event]) -> String {
    render_at(meta, events, Utc::now())
}

/// Render with an explicit generation timestamp (`DTSTAMP`). Apart
/// from that field the output only depends on `meta` and `events`.
pub fn render_at(meta: &CalendarMeta, events: &[Event], generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(meta.name)),
    ];
    if !meta.description.is_empty() {
        lines.push(format!("X-WR-CALDESC:{}", escape_text(meta.description)));
    }
    lines.push("X-WR-TIMEZONE:UTC".to_string());

    let stamp = generated_at.format(DATE_TIME_FORMAT).to_string();
    for event in events {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", escape_text(event.uid())));
        lines.push(format!("DTSTAMP:{}", stamp));
        lines.push(format!("SUMMARY:{}", escape_text(event.title())));
        if event.is_all_day() {
            lines.push(format!("DTSTART;VALUE=DATE:{}", event.start().format(DATE_FORMAT)));
            lines.push(format!("DTEND;VALUE=DATE:{}", event.end().format(DATE_FORMAT)));
        } else {
            lines.push(format!("DTSTART:{}", event.start().format(DATE_TIME_FORMAT)));
            lines.push(format!("DTEND:{}", event.end().format(DATE_TIME_FORMAT)));
        }
        if !event.description().is_empty() {
            lines.push(format!("DESCRIPTION:{}", escape_text(event.description())));
        }
        if !event.location().is_empty() {
            lines.push(format!("LOCATION:{}", escape_text(event.location())));
        }
        lines.push("STATUS:CONFIRMED".to_string());
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold_line(&line));
        out.push_str("\r\n");
    }
    out
}

/// Escape a TEXT value. Carriage returns are dropped.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Fold a content line so no physical line exceeds 75 octets. Never
/// splits a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for ch in line.chars() {
        let n = ch.len_utf8();
        if width + n > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += n;
    }
    out
}

#[derive(Debug, Error)]
pub enum IcsError {
    #[error("unreadable calendar document: {0}")]
    Unreadable(String),
    #[error("event {uid}: {reason}")]
    Malformed { uid: String, reason: String },
    #[error(transparent)]
    Event(#[from] EventError),
}

fn malformed(uid: &str, reason: impl Into<String>) -> IcsError {
    IcsError::Malformed {
        uid: uid.to_string(),
        reason: reason.into(),
    }
}

// Feeds are always rendered in UTC; zoned values are taken as written
fn naive_utc(moment: CalendarDateTime) -> NaiveDateTime {
    match moment {
        CalendarDateTime::Utc(dt) => dt.naive_utc(),
        CalendarDateTime::Floating(naive) => naive,
        CalendarDateTime::WithTimezone { date_time, .. } => date_time,
    }
}

fn read_event(component: &icalendar::Event) -> Result<Event, IcsError> {
    let uid = component
        .get_uid()
        .ok_or_else(|| malformed("", "VEVENT without UID"))?
        .to_string();
    let title = component.get_summary().unwrap_or_default();
    let start = component
        .get_start()
        .ok_or_else(|| malformed(&uid, "missing or invalid DTSTART"))?;

    let event = match (start, component.get_end()) {
        (DatePerhapsTime::Date(start), end) => {
            let event = Event::all_day(uid.clone(), title, start)?;
            match end {
                None => event,
                Some(DatePerhapsTime::Date(end)) if end.and_time(NaiveTime::MIN) == event.end() => {
                    event
                }
                Some(_) => return Err(EventError::InvalidAllDay(uid).into()),
            }
        }
        (DatePerhapsTime::DateTime(start), end) => {
            let start = naive_utc(start);
            let end = match end {
                None => start,
                Some(DatePerhapsTime::DateTime(end)) => naive_utc(end),
                Some(DatePerhapsTime::Date(_)) => {
                    return Err(malformed(&uid, "DTEND is a date but DTSTART is not"));
                }
            };
            Event::timed(uid, title, start, end)?
        }
    };

    Ok(event
        .with_description(component.get_description().unwrap_or_default())
        .with_location(component.get_location().unwrap_or_default()))
}

/// Read the events of a calendar document back. Only the properties
/// the renderer writes are interpreted; anything else is skipped.
pub fn parse(doc: &str) -> Result<Vec<Event>, IcsError> {
    let calendar = doc.parse::<Calendar>().map_err(IcsError::Unreadable)?;

    calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .map(read_event)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn meta() -> CalendarMeta<'static> {
        CalendarMeta {
            name: "IMDb",
            description: "IMDb releases integration",
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn it_renders_all_day_events_as_dates() {
        let event = Event::all_day("imdb-tt1", "Some Movie", day(2025, 6, 27)).unwrap();
        let doc = render_at(&meta(), &[event], stamp());

        assert!(doc.contains("DTSTART;VALUE=DATE:20250627\r\n"));
        assert!(doc.contains("DTEND;VALUE=DATE:20250628\r\n"));
        assert!(doc.contains("SUMMARY:Some Movie\r\n"));
        assert!(doc.contains("UID:imdb-tt1\r\n"));
        assert!(doc.contains("STATUS:CONFIRMED\r\n"));
        assert!(doc.contains("DTSTAMP:20250601T120000Z\r\n"));
        assert!(!doc.contains("DESCRIPTION"));
        assert!(!doc.contains("LOCATION"));
    }

    #[test]
    fn it_renders_timed_events_in_utc() {
        let start = day(2025, 7, 1).and_hms_opt(18, 30, 0).unwrap();
        let end = day(2025, 7, 1).and_hms_opt(21, 0, 0).unwrap();
        let event = Event::timed("twitch-1", "Stream", start, end)
            .unwrap()
            .with_location("https://twitch.tv/someone");
        let doc = render_at(&meta(), &[event], stamp());

        assert!(doc.contains("DTSTART:20250701T183000Z\r\n"));
        assert!(doc.contains("DTEND:20250701T210000Z\r\n"));
        assert!(doc.contains("LOCATION:https://twitch.tv/someone\r\n"));
    }

    #[test]
    fn it_renders_calendar_metadata() {
        let doc = render_at(&meta(), &[], stamp());
        assert!(doc.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(doc.contains("X-WR-CALNAME:IMDb\r\n"));
        assert!(doc.contains("X-WR-CALDESC:IMDb releases integration\r\n"));
        assert!(doc.ends_with("END:VCALENDAR\r\n"));

        let bare = CalendarMeta {
            name: "Bare",
            description: "",
        };
        assert!(!render_at(&bare, &[], stamp()).contains("X-WR-CALDESC"));
    }

    #[test]
    fn it_escapes_reserved_characters() {
        assert_eq!(
            escape_text("a,b;c\\d\nline\r"),
            "a\\,b\\;c\\\\d\\nline"
        );
    }

    #[test]
    fn it_folds_long_lines_on_character_boundaries() {
        let title = "é".repeat(80);
        let event = Event::all_day("long", title.clone(), day(2025, 1, 1)).unwrap();
        let doc = render_at(&meta(), &[event], stamp());

        for line in doc.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "line too long: {}", line);
        }
        let parsed = parse(&doc).unwrap();
        assert_eq!(parsed[0].title(), title);
    }

    #[test]
    fn it_renders_identical_documents_for_identical_input() {
        let events = vec![
            Event::all_day("a", "A, the movie", day(2025, 6, 27))
                .unwrap()
                .with_description("Genres: Drama; Thriller"),
        ];
        assert_eq!(
            render_at(&meta(), &events, stamp()),
            render_at(&meta(), &events, stamp())
        );
    }

    #[test]
    fn it_parses_rendered_documents() {
        let start = day(2025, 7, 1).and_hms_opt(18, 30, 0).unwrap();
        let events = vec![
            Event::all_day("imdb-tt1", "Some Movie", day(2025, 6, 27))
                .unwrap()
                .with_description("Title: Some Movie | Cast: A, B\nsecond line"),
            Event::timed("twitch-1", "Stream; live", start, start).unwrap(),
        ];
        let doc = render_at(&meta(), &events, stamp());
        assert_eq!(parse(&doc).unwrap(), events);
    }

    #[test]
    fn it_reads_documents_from_other_producers() {
        let doc = "BEGIN:VCALENDAR\r\n\
                   VERSION:2.0\r\n\
                   PRODID:-//Other//Other//EN\r\n\
                   BEGIN:VEVENT\r\n\
                   UID:other-1@example.com\r\n\
                   DTSTART:20250205T100000Z\r\n\
                   DTEND:20250205T110000Z\r\n\
                   SUMMARY:Team Meeting\r\n\
                   LOCATION:Room A\\, 2nd floor\r\n\
                   END:VEVENT\r\n\
                   BEGIN:VTODO\r\n\
                   UID:todo-1\r\n\
                   SUMMARY:Not an event\r\n\
                   END:VTODO\r\n\
                   END:VCALENDAR\r\n";

        let events = parse(doc).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid(), "other-1@example.com");
        assert_eq!(events[0].location(), "Room A, 2nd floor");
        assert_eq!(
            events[0].start(),
            day(2025, 2, 5).and_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn it_rejects_malformed_events() {
        let doc = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nSUMMARY:X\r\nDTSTART:tomorrow\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        assert!(parse(doc).is_err());

        let doc = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:X\r\nDTSTART;VALUE=DATE:20250627\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        assert!(matches!(parse(doc), Err(IcsError::Malformed { .. })));

        // All-day events span exactly one day
        let doc = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\nSUMMARY:X\r\nDTSTART;VALUE=DATE:20250627\r\nDTEND;VALUE=DATE:20250630\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        assert!(matches!(parse(doc), Err(IcsError::Event(_))));
    }
}
