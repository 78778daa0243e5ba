//! Public types for the integrations API
use serde::Serialize;

use crate::calendar::ParamSpec;
use crate::integration::Integration;

#[derive(Serialize)]
pub struct IntegrationSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_url: String,
    pub multi_calendar: bool,
    pub strict: bool,
    pub path: String,
    pub calendars: Vec<String>,
    pub params: Vec<ParamSpec>,
}

impl From<&Integration> for IntegrationSummary {
    fn from(integration: &Integration) -> Self {
        Self {
            id: integration.id().to_string(),
            name: integration.name().to_string(),
            description: integration.description().to_string(),
            base_url: integration.base_url().to_string(),
            multi_calendar: integration.is_multi_calendar(),
            strict: integration.is_strict(),
            path: format!("{}/events", integration.route_prefix()),
            calendars: integration.calendar_ids(),
            params: integration.schema().specs().to_vec(),
        }
    }
}
