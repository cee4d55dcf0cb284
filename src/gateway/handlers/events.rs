//! Event handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    response::Response,
};
use serde_json::Value;

use super::super::error::GatewayError;
use super::super::state::AppState;
use super::super::types::{CreateQuery, Envelope, PageQuery};
use super::created_response;
use crate::auth::{ANY_ROLE, Credential, ORGANIZER_ONLY};

/// List events
///
/// Accepts `limit`/`offset` or `page`/`size`.
#[utoipa::path(
    get,
    path = "/composite/events",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of events", body = Envelope),
        (status = 400, description = "Invalid pagination", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Events"
)]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let Query(query) = query?;
    let window = query.window().map_err(GatewayError::BadRequest)?;
    let envelope = state.composite(Some(credential)).list_events(window).await?;
    Ok(Json(envelope))
}

#[utoipa::path(
    get,
    path = "/composite/events/{event_id}",
    params(("event_id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event retrieved", body = Envelope),
        (status = 404, description = "Unknown event", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Events"
)]
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(event_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let envelope = state.composite(Some(credential)).get_event(&event_id).await?;
    Ok(Json(envelope))
}

/// Create event (organizer)
#[utoipa::path(
    post,
    path = "/composite/events",
    params(CreateQuery),
    request_body(content = Object, description = "Event payload, passed through"),
    responses(
        (status = 201, description = "Event created", body = Envelope),
        (status = 202, description = "Creation accepted", body = Envelope),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Events"
)]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    query: Result<Query<CreateQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let Query(query) = query?;
    let Json(event) = body?;
    let created = state
        .composite(Some(credential))
        .create_event(event, query.async_create)
        .await?;
    Ok(created_response(created))
}

/// Update event and notify its attendees (organizer)
#[utoipa::path(
    put,
    path = "/composite/events/{event_id}",
    params(("event_id" = String, Path, description = "Event id")),
    request_body(content = Object, description = "Event payload, passed through"),
    responses(
        (status = 200, description = "Event updated", body = Envelope),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Events"
)]
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(event_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let Json(event) = body?;
    let envelope = state
        .composite(Some(credential))
        .update_event(&event_id, event)
        .await?;
    Ok(Json(envelope))
}

/// Delete event (organizer)
#[utoipa::path(
    delete,
    path = "/composite/events/{event_id}",
    params(("event_id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted", body = Envelope),
        (status = 403, description = "Organizer role required"),
        (status = 404, description = "Unknown event", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Events"
)]
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(event_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let envelope = state
        .composite(Some(credential))
        .delete_event(&event_id)
        .await?;
    Ok(Json(envelope))
}

/// Tickets booked for an event (organizer)
#[utoipa::path(
    get,
    path = "/composite/events/{event_id}/tickets",
    params(("event_id" = String, Path, description = "Event id"), PageQuery),
    responses(
        (status = 200, description = "One page of tickets", body = Envelope),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Events"
)]
pub async fn get_event_tickets(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(event_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let Query(query) = query?;
    let window = query.window().map_err(GatewayError::BadRequest)?;
    let envelope = state
        .composite(Some(credential))
        .event_tickets(&event_id, window)
        .await?;
    Ok(Json(envelope))
}
