use anyhow::{Result, anyhow};

use crate::api::public::integrations::IntegrationSummary;
use crate::core::AppConfig;
use crate::sources;

pub fn run(integration: Option<&str>, config: &AppConfig) -> Result<()> {
    let registry = sources::registry(config)?;

    let summaries = match integration {
        Some(id) => {
            let integration = registry
                .get(id)
                .ok_or_else(|| anyhow!("Unknown integration {}", id))?;
            vec![IntegrationSummary::from(integration.as_ref())]
        }
        None => registry
            .iter()
            .map(|i| IntegrationSummary::from(i.as_ref()))
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}
