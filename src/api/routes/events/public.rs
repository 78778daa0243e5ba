//! Public types for the events API
use serde::Serialize;

use crate::calendar::ParamSpec;

/// Set on a 200 response when some of the integration's calendars
/// failed. Holds the failing calendar ids separated by commas.
pub const DEGRADED_HEADER: &str = "x-calfeed-degraded";

#[derive(Serialize)]
pub struct SchemaResponse {
    pub integration: String,
    pub path: String,
    pub params: Vec<ParamSpec>,
}
