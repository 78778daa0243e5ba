use anyhow::{Result, anyhow};

use crate::calendar::RawParams;
use crate::core::AppConfig;
use crate::feed::{self, CalendarMeta, Format};
use crate::sources;

/// Parse a `name=value` pair given on the command line.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected `name=value`, got `{}`", raw)),
    }
}

pub async fn run(
    integration: &str,
    params: Vec<(String, String)>,
    json: bool,
    config: &AppConfig,
) -> Result<()> {
    let registry = sources::registry(config)?;
    let integration = registry
        .get(integration)
        .ok_or_else(|| anyhow!("Unknown integration {}", integration))?;

    let raw: RawParams = params.into_iter().collect();
    let feed = integration.fetch(&raw).await?;
    if feed.is_degraded() {
        eprintln!(
            "Warning: calendars failed: {}",
            feed.failed_calendars().join(", ")
        );
    }

    let format = Format::from_ics_flag(!json);
    let doc = feed::render(format, &CalendarMeta::from(integration.as_ref()), &feed.events)?;
    print!("{}", doc);
    Ok(())
}
