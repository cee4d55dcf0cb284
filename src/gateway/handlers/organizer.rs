//! Organizer handlers (organizer role only, except login)

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::{Path, State, rejection::{FormRejection, JsonRejection}},
    response::Response,
};
use serde_json::Value;

use super::super::error::GatewayError;
use super::super::services::Created;
use super::super::state::AppState;
use super::super::types::Envelope;
use super::created_response;
use crate::auth::{Credential, ORGANIZER_ONLY};

/// Profile of the calling organizer
#[utoipa::path(
    get,
    path = "/composite/organizer",
    responses(
        (status = 200, description = "Organizer retrieved", body = Envelope),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Organizer"
)]
pub async fn get_current_organizer(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
) -> Result<Json<Envelope>, GatewayError> {
    let claims = state.authorize(&credential, ORGANIZER_ONLY)?;
    let envelope = state
        .composite(Some(credential))
        .current_organizer(&claims)
        .await?;
    Ok(Json(envelope))
}

#[utoipa::path(
    get,
    path = "/composite/organizer/{organizer_id}",
    params(("organizer_id" = String, Path, description = "Organizer id")),
    responses(
        (status = 200, description = "Organizer retrieved", body = Envelope),
        (status = 403, description = "Organizer role required"),
        (status = 404, description = "Unknown organizer", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Organizer"
)]
pub async fn get_organizer(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(organizer_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let envelope = state
        .composite(Some(credential))
        .get_organizer(&organizer_id)
        .await?;
    Ok(Json(envelope))
}

/// Create organizer
#[utoipa::path(
    post,
    path = "/composite/organizer",
    request_body(content = Object, description = "Organizer payload, passed through"),
    responses(
        (status = 201, description = "Organizer created", body = Envelope),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Organizer"
)]
pub async fn create_organizer(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let Json(organizer) = body?;
    let envelope = state
        .composite(Some(credential))
        .create_organizer(organizer)
        .await?;
    Ok(created_response(Created::Sync(envelope)))
}

#[utoipa::path(
    put,
    path = "/composite/organizer/{organizer_id}",
    params(("organizer_id" = String, Path, description = "Organizer id")),
    request_body(content = Object, description = "Organizer fields, passed through"),
    responses(
        (status = 200, description = "Organizer updated", body = Envelope),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Organizer"
)]
pub async fn modify_organizer(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(organizer_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let Json(organizer) = body?;
    let envelope = state
        .composite(Some(credential))
        .modify_organizer(&organizer_id, organizer)
        .await?;
    Ok(Json(envelope))
}

#[utoipa::path(
    delete,
    path = "/composite/organizer/{organizer_id}",
    params(("organizer_id" = String, Path, description = "Organizer id")),
    responses(
        (status = 200, description = "Organizer deleted", body = Envelope),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_jwt" = [])),
    tag = "Organizer"
)]
pub async fn delete_organizer(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(organizer_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ORGANIZER_ONLY)?;
    let envelope = state
        .composite(Some(credential))
        .delete_organizer(&organizer_id)
        .await?;
    Ok(Json(envelope))
}

/// Organizer login passthrough (public)
#[utoipa::path(
    post,
    path = "/composite/organizer/authenticate",
    request_body(content = Object, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = Envelope),
        (status = 401, description = "Bad credentials")
    ),
    tag = "Organizer"
)]
pub async fn authenticate_organizer(
    State(state): State<Arc<AppState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    let Form(form) = form?;
    let envelope = state.composite(None).authenticate_organizer(form).await?;
    Ok(Json(envelope))
}
