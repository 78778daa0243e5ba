//! A registered data source: metadata plus the calendars it owns.
pub mod aggregate;
mod registry;
pub use aggregate::{CalendarFailure, aggregate};
pub use registry::Registry;

use anyhow::{Result, bail};

use crate::calendar::{
    BoxedCalendar, ParamDefault, ParamSchema, ParamSpec, RawParams, bind, invoke,
};
use crate::error::FeedError;
use crate::feed::Feed;

/// Query parameter reserved for selecting the output mode.
pub const RESERVED_PARAM: &str = "ics";

/// How the reserved parameter appears in generated documentation.
pub const ICS_PARAM: ParamSpec = ParamSpec::optional(RESERVED_PARAM, ParamDefault::Boolean(true))
    .with_description("Return an iCalendar document instead of JSON events");

/// Paths mounted next to the integrations that no integration may use.
pub const RESERVED_PREFIXES: &[&str] = &["/integrations"];

/// Path prefix for an integration id, e.g. `google_sheets` ->
/// `/google-sheets`.
pub fn route_prefix(id: &str) -> String {
    let slug: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("/{}", slug)
}

/// Immutable once built. Every owned calendar declares the same
/// parameter schema, so one bound parameter set applies to all of them.
pub struct Integration {
    id: String,
    name: String,
    description: String,
    base_url: String,
    calendars: Vec<BoxedCalendar>,
    multi_calendar: bool,
    strict: bool,
    schema: ParamSchema,
}

impl Integration {
    pub fn builder(id: &str, name: &str) -> IntegrationBuilder {
        IntegrationBuilder {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            base_url: String::new(),
            calendars: Vec::new(),
            strict: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_multi_calendar(&self) -> bool {
        self.multi_calendar
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn calendars(&self) -> &[BoxedCalendar] {
        &self.calendars
    }

    pub fn calendar_ids(&self) -> Vec<String> {
        self.calendars.iter().map(|c| c.id().to_string()).collect()
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    pub fn route_prefix(&self) -> String {
        route_prefix(&self.id)
    }

    /// Bind `raw` and produce this integration's events.
    ///
    /// Single calendar integrations pass their calendar's result
    /// straight through. Multi calendar integrations go through
    /// [`aggregate`], which may return a degraded feed.
    pub async fn fetch(&self, raw: &RawParams) -> Result<Feed, FeedError> {
        tracing::debug!("Fetching {} with {:?}", self.id, raw);

        match self.calendars.as_slice() {
            [calendar] if !self.multi_calendar => {
                let events = invoke(&**calendar, raw).await?;
                Ok(Feed::new(events))
            }
            calendars => {
                let params = bind(&self.schema, raw)?;
                aggregate(calendars, &params, self.strict).await
            }
        }
    }
}

pub struct IntegrationBuilder {
    id: String,
    name: String,
    description: String,
    base_url: String,
    calendars: Vec<BoxedCalendar>,
    strict: bool,
}

impl IntegrationBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Calendars are aggregated in the order they are added.
    pub fn calendar(mut self, calendar: BoxedCalendar) -> Self {
        self.calendars.push(calendar);
        self
    }

    /// Fail the whole feed when any owned calendar fails.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Result<Integration> {
        let valid_id = !self.id.is_empty()
            && self
                .id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid_id {
            bail!("Integration id `{}` must be a lowercase slug", self.id);
        }
        if self.name.trim().is_empty() {
            bail!("Integration {} is missing a name", self.id);
        }

        let Some(first) = self.calendars.first() else {
            bail!("Integration {} has no calendars", self.id);
        };
        let schema = ParamSchema::from_specs(first.params());

        if let Some(other) = self
            .calendars
            .iter()
            .find(|c| ParamSchema::from_specs(c.params()) != schema)
        {
            bail!(
                "Calendar {} of integration {} declares different parameters than {}",
                other.id(),
                self.id,
                first.id()
            );
        }
        if schema.get(RESERVED_PARAM).is_some() {
            bail!(
                "Integration {} declares the reserved parameter `{}`",
                self.id,
                RESERVED_PARAM
            );
        }
        let duplicates = schema.duplicates();
        if !duplicates.is_empty() {
            bail!(
                "Integration {} declares duplicate parameters: {}",
                self.id,
                duplicates.join(", ")
            );
        }

        let mut calendar_ids = self.calendars.iter().map(|c| c.id()).collect::<Vec<_>>();
        calendar_ids.sort();
        if calendar_ids.windows(2).any(|w| w[0] == w[1]) {
            bail!("Integration {} owns calendars with the same id", self.id);
        }

        Ok(Integration {
            multi_calendar: self.calendars.len() > 1,
            id: self.id,
            name: self.name,
            description: self.description,
            base_url: self.base_url,
            calendars: self.calendars,
            strict: self.strict,
            schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{
        Calendar, CalendarError, Event, ParamDefault, ParamKind, ParamSpec, Params,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;

    const STREAMER_PARAMS: &[ParamSpec] = &[ParamSpec::required("streamer_name", ParamKind::String)];
    const OTHER_PARAMS: &[ParamSpec] = &[ParamSpec::optional("limit", ParamDefault::Integer(5))];
    const RESERVED: &[ParamSpec] = &[ParamSpec::optional("ics", ParamDefault::Boolean(true))];

    struct Fixed {
        id: &'static str,
        params: &'static [ParamSpec],
    }

    #[async_trait]
    impl Calendar for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn params(&self) -> &'static [ParamSpec] {
            self.params
        }

        async fn fetch_events(&self, params: &Params) -> Result<Vec<Event>, CalendarError> {
            let name = params.get_str("streamer_name")?;
            let day = NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();
            Ok(vec![Event::all_day(format!("{}-{}", self.id, name), name, day)?])
        }
    }

    fn fixed(id: &'static str, params: &'static [ParamSpec]) -> BoxedCalendar {
        Box::new(Fixed { id, params })
    }

    #[test]
    fn it_derives_route_prefixes_from_ids() {
        assert_eq!(route_prefix("google_sheets"), "/google-sheets");
        assert_eq!(route_prefix("imdb"), "/imdb");
        assert_eq!(route_prefix("a_b-c_d"), "/a-b-c-d");
    }

    #[test]
    fn it_flags_multi_calendar_integrations() {
        let single = Integration::builder("twitch", "Twitch")
            .calendar(fixed("a", STREAMER_PARAMS))
            .build()
            .unwrap();
        assert!(!single.is_multi_calendar());

        let multi = Integration::builder("twitch", "Twitch")
            .calendar(fixed("a", STREAMER_PARAMS))
            .calendar(fixed("b", STREAMER_PARAMS))
            .build()
            .unwrap();
        assert!(multi.is_multi_calendar());
        assert_eq!(multi.calendar_ids(), vec!["a", "b"]);
    }

    #[test]
    fn it_rejects_invalid_integrations() {
        assert!(
            Integration::builder("Google Sheets", "Sheets")
                .calendar(fixed("a", STREAMER_PARAMS))
                .build()
                .is_err()
        );
        assert!(Integration::builder("empty", "Empty").build().is_err());
        assert!(
            Integration::builder("mixed", "Mixed")
                .calendar(fixed("a", STREAMER_PARAMS))
                .calendar(fixed("b", OTHER_PARAMS))
                .build()
                .is_err()
        );
        assert!(
            Integration::builder("reserved", "Reserved")
                .calendar(fixed("a", RESERVED))
                .build()
                .is_err()
        );
        assert!(
            Integration::builder("twins", "Twins")
                .calendar(fixed("a", STREAMER_PARAMS))
                .calendar(fixed("a", STREAMER_PARAMS))
                .build()
                .is_err()
        );
    }

    #[tokio::test]
    async fn it_fetches_single_calendar_integrations_directly() {
        let integration = Integration::builder("twitch", "Twitch")
            .calendar(fixed("twitch", STREAMER_PARAMS))
            .build()
            .unwrap();

        let raw = RawParams::from([("streamer_name".to_string(), "shroud".to_string())]);
        let feed = integration.fetch(&raw).await.unwrap();
        assert_eq!(feed.events.len(), 1);
        assert_eq!(feed.events[0].uid(), "twitch-shroud");
        assert!(!feed.is_degraded());
    }

    #[tokio::test]
    async fn it_rejects_parameters_before_fetching() {
        let integration = Integration::builder("twitch", "Twitch")
            .calendar(fixed("twitch", STREAMER_PARAMS))
            .build()
            .unwrap();

        let result = integration.fetch(&RawParams::new()).await;
        assert!(matches!(result, Err(FeedError::InvalidParameters(_))));
    }
}
