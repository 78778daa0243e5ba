//! Router for the integrations API

use axum::{Router, extract::State, response::Json, routing::get};

use super::public::IntegrationSummary;
use crate::api::state::SharedState;

async fn integrations_handler(State(state): State<SharedState>) -> Json<Vec<IntegrationSummary>> {
    let summaries = state
        .registry
        .iter()
        .map(|integration| IntegrationSummary::from(integration.as_ref()))
        .collect();
    Json(summaries)
}

/// Create the integrations router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(integrations_handler))
}
