use std::sync::Arc;

use crate::integration::Registry;

pub type SharedState = Arc<AppState>;

/// Read-only after startup, so no lock is needed around it.
pub struct AppState {
    pub registry: Registry,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }
}
