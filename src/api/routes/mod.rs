//! API routes module

pub mod events;
pub mod integrations;

use std::sync::Arc;

use axum::Router;

use crate::api::state::SharedState;
use crate::integration::Registry;

/// Create the combined API router. Every registered integration is
/// mounted under its own path prefix.
pub fn router(registry: &Registry) -> Router<SharedState> {
    registry.iter().fold(
        // Integration listing
        Router::new().nest("/integrations", integrations::router()),
        |router, integration| {
            router.nest(
                &integration.route_prefix(),
                events::router(Arc::clone(integration)),
            )
        },
    )
}
