//! Router for an integration's feed

use std::sync::Arc;

use axum::{
    Extension, Router,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use axum_extra::extract::{Query, WithRejection};
use http::{HeaderName, HeaderValue, header};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::calendar::RawParams;
use crate::calendar::params::parse_bool;
use crate::error::FeedError;
use crate::feed::{self, CalendarMeta, Format};
use crate::integration::{ICS_PARAM, Integration, RESERVED_PARAM};

fn output_format(raw: Option<String>) -> Result<Format, FeedError> {
    let Some(raw) = raw else {
        return Ok(Format::default());
    };
    parse_bool(&raw).map(Format::from_ics_flag).ok_or_else(|| {
        FeedError::InvalidParameters(format!(
            "parameter `{}` expects boolean, got `{}`",
            RESERVED_PARAM, raw
        ))
    })
}

async fn events_handler(
    Extension(integration): Extension<Arc<Integration>>,
    WithRejection(Query(mut params), _): WithRejection<Query<RawParams>, ApiError>,
) -> Result<Response, ApiError> {
    // Never forwarded to the calendars
    let format = output_format(params.remove(RESERVED_PARAM))?;

    let feed = integration.fetch(&params).await?;
    let body = feed::render(format, &CalendarMeta::from(integration.as_ref()), &feed.events)?;

    let mut response = ([(header::CONTENT_TYPE, format.content_type())], body).into_response();
    if feed.is_degraded() {
        let failures = serde_json::to_string(&feed.failures).map_err(anyhow::Error::from)?;
        tracing::warn!(
            integration = integration.id(),
            failures = %failures,
            "Serving a degraded feed"
        );
        let failed = feed.failed_calendars().join(",");
        let value = HeaderValue::from_str(&failed).map_err(anyhow::Error::from)?;
        response
            .headers_mut()
            .insert(HeaderName::from_static(public::DEGRADED_HEADER), value);
    }

    Ok(response)
}

async fn schema_handler(
    Extension(integration): Extension<Arc<Integration>>,
) -> Json<public::SchemaResponse> {
    let mut params = integration.schema().specs().to_vec();
    params.push(ICS_PARAM);

    Json(public::SchemaResponse {
        integration: integration.id().to_string(),
        path: format!("{}/events", integration.route_prefix()),
        params,
    })
}

/// Create the router for one integration
pub fn router(integration: Arc<Integration>) -> Router<SharedState> {
    Router::new()
        .route("/events", get(events_handler))
        .route("/schema", get(schema_handler))
        .layer(Extension(integration))
}
