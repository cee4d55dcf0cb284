//! Gateway error types.
//!
//! Every failure a composite operation can surface, and its HTTP mapping.

use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;

use crate::auth::TokenError;
use crate::backend::BackendError;
use crate::gateway::types::Envelope;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing, malformed, expired or badly signed credential
    #[error("{0}")]
    Unauthorized(String),

    /// Valid credential, role not permitted
    #[error("{0}")]
    Forbidden(String),

    /// Query or body rejected before any backend call
    #[error("{0}")]
    BadRequest(String),

    /// Domain precondition failed (e.g. insufficient capacity)
    #[error("{0}")]
    InvalidState(String),

    #[error("resource not found")]
    NotFound { body: String },

    /// Backend answered non-2xx; status and body pass through untouched
    #[error("backend returned HTTP {status}")]
    Upstream { status: u16, body: String },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::InvalidState(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for GatewayError {
    fn from(e: TokenError) -> Self {
        if e.is_forbidden() {
            Self::Forbidden(e.to_string())
        } else {
            Self::Unauthorized(e.to_string())
        }
    }
}

impl From<BackendError> for GatewayError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Status {
                status: 404, body, ..
            } => Self::NotFound { body },
            BackendError::Status { status, body, .. } => Self::Upstream { status, body },
            other => Self::Unexpected(other.to_string()),
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(e: QueryRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<FormRejection> for GatewayError {
    fn from(e: FormRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Upstream { body, .. } => {
                if serde_json::from_str::<Value>(&body).is_ok() {
                    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
                } else {
                    (status, body).into_response()
                }
            }
            Self::NotFound { body } => {
                let envelope = Envelope {
                    data: Some(parse_body(&body)),
                    message: "Resource not found".to_string(),
                    links: Vec::new(),
                };
                (status, Json(envelope)).into_response()
            }
            Self::Unexpected(detail) => {
                tracing::error!("[GATEWAY] unexpected failure: {}", detail);
                (status, Json(Envelope::message_only("Internal Server Error"))).into_response()
            }
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::InvalidState(msg) => (status, Json(Envelope::message_only(msg))).into_response(),
        }
    }
}
