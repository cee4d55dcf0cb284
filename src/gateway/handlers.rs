//! HTTP handlers
//!
//! Thin adapters: authorize, extract, delegate to the engine, shape status
//! and headers.

pub mod events;
pub mod health;
pub mod organizer;
pub mod tickets;
pub mod users;

pub use events::*;
pub use health::*;
pub use organizer::*;
pub use tickets::*;
pub use users::*;

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use super::services::Created;
use super::types::envelope::task_href;

/// 201 with a `Link` to the new resource, or 202 with a `Location` to the
/// deferred task.
pub fn created_response(created: Created) -> Response {
    match created {
        Created::Sync(envelope) => {
            let mut headers = HeaderMap::new();
            if let Some(link) = envelope.link("self") {
                let value = format!("<{}>; rel=\"self\"", link.href);
                if let Ok(value) = HeaderValue::from_str(&value) {
                    headers.insert(header::LINK, value);
                }
            }
            (StatusCode::CREATED, headers, Json(envelope)).into_response()
        }
        Created::Accepted { task_id, envelope } => (
            StatusCode::ACCEPTED,
            [(header::LOCATION, task_href(&task_id))],
            Json(envelope),
        )
            .into_response(),
    }
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Composite Service" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::{Operation, Resource, ResourceContext, build};

    #[test]
    fn test_sync_create_sets_link_header() {
        let ctx = ResourceContext::new(Resource::User, Operation::Create).with_id(Some("u9".into()));
        let resp = created_response(Created::Sync(build(None, "created", &ctx)));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get(header::LINK).unwrap(),
            "</composite/users/u9>; rel=\"self\""
        );
    }

    #[test]
    fn test_sync_create_without_id_has_no_link() {
        let ctx = ResourceContext::new(Resource::Event, Operation::Create);
        let resp = created_response(Created::Sync(build(None, "created", &ctx)));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(resp.headers().get(header::LINK).is_none());
    }

    #[test]
    fn test_accepted_sets_location() {
        let ctx = ResourceContext::new(Resource::Event, Operation::Accepted);
        let resp = created_response(Created::Accepted {
            task_id: "t1".into(),
            envelope: build(None, "accepted", &ctx),
        });
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/composite/tasks/t1"
        );
    }
}
