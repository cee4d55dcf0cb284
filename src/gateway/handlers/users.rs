//! User handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State, rejection::{FormRejection, JsonRejection, QueryRejection}},
    response::Response,
};
use serde_json::Value;

use super::super::error::GatewayError;
use super::super::state::AppState;
use super::super::types::{CreateQuery, Envelope, PageQuery};
use super::created_response;
use crate::auth::{ANY_ROLE, Credential};

/// Create user
///
/// `async_create=true` answers 202 before the user service is called.
#[utoipa::path(
    post,
    path = "/composite/users",
    params(CreateQuery),
    request_body(content = Object, description = "User payload, passed through"),
    responses(
        (status = 201, description = "User created", body = Envelope),
        (status = 202, description = "Creation accepted", body = Envelope),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not permitted")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    query: Result<Query<CreateQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let Query(query) = query?;
    let Json(user) = body?;
    let created = state
        .composite(Some(credential))
        .create_user(user, query.async_create)
        .await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/composite/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User retrieved", body = Envelope),
        (status = 404, description = "Unknown user", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let envelope = state.composite(Some(credential)).get_user(&user_id).await?;
    Ok(Json(envelope))
}

#[utoipa::path(
    put,
    path = "/composite/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    request_body(content = Object, description = "User fields, passed through"),
    responses(
        (status = 200, description = "User updated", body = Envelope),
        (status = 404, description = "Unknown user", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn modify_user(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let Json(user) = body?;
    let envelope = state
        .composite(Some(credential))
        .modify_user(&user_id, user)
        .await?;
    Ok(Json(envelope))
}

#[utoipa::path(
    delete,
    path = "/composite/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = Envelope),
        (status = 404, description = "Unknown user", body = Envelope)
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let envelope = state.composite(Some(credential)).delete_user(&user_id).await?;
    Ok(Json(envelope))
}

/// Tickets and events for a user
///
/// Both backend lists are fetched concurrently; pagination applies to events.
#[utoipa::path(
    get,
    path = "/composite/users/{user_id}/tickets",
    params(("user_id" = String, Path, description = "User id"), PageQuery),
    responses(
        (status = 200, description = "Tickets and one page of events", body = Envelope),
        (status = 400, description = "Invalid pagination")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn get_user_tickets(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    Path(user_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    state.authorize(&credential, ANY_ROLE)?;
    let Query(query) = query?;
    let window = query.window().map_err(GatewayError::BadRequest)?;
    let envelope = state
        .composite(Some(credential))
        .user_tickets(&user_id, window)
        .await?;
    Ok(Json(envelope))
}

/// Login passthrough (public)
#[utoipa::path(
    post,
    path = "/composite/users/authenticate",
    request_body(content = Object, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = Envelope),
        (status = 401, description = "Bad credentials")
    ),
    tag = "Users"
)]
pub async fn authenticate_user(
    State(state): State<Arc<AppState>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<Envelope>, GatewayError> {
    let Form(form) = form?;
    let envelope = state.composite(None).authenticate_user(form).await?;
    Ok(Json(envelope))
}
