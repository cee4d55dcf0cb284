//! Ticket handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
};
use serde_json::Value;

use super::super::error::GatewayError;
use super::super::services::Created;
use super::super::state::AppState;
use super::super::types::Envelope;
use super::created_response;
use crate::auth::{ANY_ROLE, Credential};

/// Book a ticket
///
/// Rejected with 400 when the event has fewer seats left than requested.
#[utoipa::path(
    post,
    path = "/composite/ticket",
    request_body(content = Object, description = "Booking: `EID` and optional `Guests`"),
    responses(
        (status = 201, description = "Ticket booked", body = Envelope),
        (status = 400, description = "Not enough guests remaining", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Tickets"
)]
pub async fn book_ticket(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let claims = state.authorize(&credential, ANY_ROLE)?;
    let Json(booking) = body?;
    let envelope = state
        .composite(Some(credential))
        .book_ticket(&claims, booking)
        .await?;
    Ok(created_response(Created::Sync(envelope)))
}

#[utoipa::path(
    get,
    path = "/composite/ticket/{ticket_id}",
    params(("ticket_id" = String, Path, description = "Ticket id")),
    responses((status = 200, description = "Ticket retrieved", body = Envelope)),
    security(("bearer_jwt" = [])),
    tag = "Tickets"
)]
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let envelope = state.composite(Some(credential)).get_ticket(&ticket_id).await?;
    Ok(Json(envelope))
}

/// Cancel a ticket and restore the event's capacity
#[utoipa::path(
    delete,
    path = "/composite/ticket/{ticket_id}",
    params(("ticket_id" = String, Path, description = "Ticket id")),
    responses((status = 200, description = "Ticket canceled", body = Envelope)),
    security(("bearer_jwt" = [])),
    tag = "Tickets"
)]
pub async fn cancel_ticket(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(ticket_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let envelope = state
        .composite(Some(credential))
        .cancel_ticket(&ticket_id)
        .await?;
    Ok(Json(envelope))
}
