use std::sync::Arc;

use anyhow::{Result, bail};

use super::{Integration, RESERVED_PREFIXES};

/// Every integration the process serves, in registration order.
/// Built once at startup and shared read-only afterwards.
#[derive(Default, Clone)]
pub struct Registry {
    integrations: Vec<Arc<Integration>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, integration: Integration) -> Result<()> {
        let prefix = integration.route_prefix();
        if RESERVED_PREFIXES.contains(&prefix.as_str()) {
            bail!("Integration {} uses the reserved path {}", integration.id(), prefix);
        }
        if let Some(existing) = self
            .integrations
            .iter()
            .find(|i| i.id() == integration.id() || i.route_prefix() == prefix)
        {
            bail!(
                "Integration {} collides with {} on {}",
                integration.id(),
                existing.id(),
                prefix
            );
        }
        tracing::debug!("Registered integration {} at {}", integration.id(), prefix);
        self.integrations.push(Arc::new(integration));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<Integration>> {
        self.integrations.iter().find(|i| i.id() == id).cloned()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Integration>> {
        self.integrations.iter()
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }
}
