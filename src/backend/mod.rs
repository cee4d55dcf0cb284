//! Backend Client Adapter
//!
//! One typed function set per backend service ([`UserService`],
//! [`EventService`], [`TicketService`]). Every call:
//! - forwards the caller's bearer credential when one is present
//! - classifies non-2xx answers as [`BackendError::Status`] with the
//!   backend's status and body untouched
//! - never retries and never overrides the transport timeout
//!
//! [`ServiceClients`] is built per request. It holds a handle onto the shared
//! connection pool and is released when the request scope ends, on every exit
//! path.

pub mod events;
pub mod tickets;
pub mod users;

use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::auth::Credential;
use crate::config::BackendsConfig;

pub use events::EventService;
pub use tickets::TicketService;
pub use users::UserService;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} unreachable: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(HashMap<String, String>),
}

/// One outbound call, fully described before it is sent.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub credential: Option<Credential>,
}

impl BackendRequest {
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, fields: HashMap<String, String>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }
}

/// Base client shared by the per-service function sets.
#[derive(Clone)]
pub struct BackendClient {
    service: &'static str,
    http: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
}

impl BackendClient {
    pub fn new(
        service: &'static str,
        http: reqwest::Client,
        base_url: &str,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            service,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn request(&self, method: Method, path: &str) -> BackendRequest {
        BackendRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            query: Vec::new(),
            body: None,
            credential: self.credential.clone(),
        }
    }

    /// Send the request and return the decoded payload.
    ///
    /// Empty success bodies decode to `null`; non-JSON success bodies are
    /// returned as a JSON string.
    pub async fn execute(&self, req: BackendRequest) -> Result<Value, BackendError> {
        tracing::debug!("[BACKEND] {} {} {}", self.service, req.method, req.url);

        let mut builder = self.http.request(req.method.clone(), &req.url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(credential) = &req.credential {
            builder = builder.bearer_auth(credential.as_str());
        }
        builder = match req.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            None => builder,
        };

        let transport = |source| BackendError::Transport {
            service: self.service,
            source,
        };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            tracing::warn!(
                "[BACKEND] {} {} {} -> {}",
                self.service,
                req.method,
                req.url,
                status
            );
            return Err(BackendError::Status {
                service: self.service,
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    pub async fn get(&self, path: &str) -> Result<Value, BackendError> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, BackendError> {
        self.execute(self.request(Method::POST, path).json(body.clone()))
            .await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, BackendError> {
        self.execute(self.request(Method::PUT, path).json(body.clone()))
            .await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, BackendError> {
        self.execute(self.request(Method::PATCH, path).json(body.clone()))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, BackendError> {
        self.execute(self.request(Method::DELETE, path)).await
    }

    pub async fn health(&self) -> Result<Value, BackendError> {
        self.get("/health").await
    }
}

/// The three backend function sets bound to one request's credential.
#[derive(Clone)]
pub struct ServiceClients {
    pub users: UserService,
    pub events: EventService,
    pub tickets: TicketService,
}

impl ServiceClients {
    pub fn new(
        http: &reqwest::Client,
        backends: &BackendsConfig,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            users: UserService::new(BackendClient::new(
                "user-management",
                http.clone(),
                &backends.user_url,
                credential.clone(),
            )),
            events: EventService::new(BackendClient::new(
                "event-management",
                http.clone(),
                &backends.event_url,
                credential.clone(),
            )),
            tickets: TicketService::new(BackendClient::new(
                "ticketing",
                http.clone(),
                &backends.ticket_url,
                credential,
            )),
        }
    }
}
