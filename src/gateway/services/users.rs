//! User composite operations.

use std::collections::HashMap;

use serde_json::{Value, json};

use super::tasks::spawn_detached;
use super::{CompositeService, Created, USER_ID_KEYS, extract_items, resource_id};
use crate::gateway::error::GatewayError;
use crate::gateway::types::{Envelope, Operation, PageWindow, Resource, ResourceContext, build};

impl CompositeService {
    pub async fn get_user(&self, user_id: &str) -> Result<Envelope, GatewayError> {
        let user = self.clients.users.get_user(user_id).await?;
        let ctx = ResourceContext::new(Resource::User, Operation::Read).with_id(Some(user_id.into()));
        Ok(build(Some(user), "User retrieved successfully", &ctx))
    }

    pub async fn create_user(
        &self,
        user: Value,
        async_create: bool,
    ) -> Result<Created, GatewayError> {
        tracing::info!("[ENGINE] create_user async={}", async_create);
        if async_create {
            let users = self.clients.users.clone();
            let task_id = spawn_detached("create_user", async move { users.create_user(&user).await });
            let ctx = ResourceContext::new(Resource::User, Operation::Accepted);
            let envelope = build(
                Some(json!({ "task_id": task_id })),
                "User creation accepted",
                &ctx,
            );
            return Ok(Created::Accepted { task_id, envelope });
        }

        let created = self.clients.users.create_user(&user).await?;
        let ctx = ResourceContext::new(Resource::User, Operation::Create)
            .with_id(resource_id(&created, USER_ID_KEYS));
        Ok(Created::Sync(build(
            Some(created),
            "User created successfully",
            &ctx,
        )))
    }

    pub async fn modify_user(&self, user_id: &str, user: Value) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] modify_user {}", user_id);
        let updated = self.clients.users.modify_user(user_id, &user).await?;
        let ctx =
            ResourceContext::new(Resource::User, Operation::Update).with_id(Some(user_id.into()));
        Ok(build(Some(updated), "User updated successfully", &ctx))
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] delete_user {}", user_id);
        self.clients.users.delete_user(user_id).await?;
        let ctx =
            ResourceContext::new(Resource::User, Operation::Delete).with_id(Some(user_id.into()));
        Ok(build(None, "User deleted successfully", &ctx))
    }

    pub async fn authenticate_user(
        &self,
        form: HashMap<String, String>,
    ) -> Result<Envelope, GatewayError> {
        let session = self.clients.users.authenticate_user(form).await?;
        let ctx = ResourceContext::new(Resource::User, Operation::Read)
            .with_id(resource_id(&session, USER_ID_KEYS));
        Ok(build(Some(session), "User authenticated successfully", &ctx))
    }

    /// A user's tickets alongside one page of the event listing.
    ///
    /// Both lists are fetched concurrently; either failing fails the whole
    /// operation. Pagination applies to the event listing.
    pub async fn user_tickets(
        &self,
        user_id: &str,
        window: PageWindow,
    ) -> Result<Envelope, GatewayError> {
        tracing::info!(
            "[ENGINE] user_tickets {} limit={} offset={}",
            user_id,
            window.limit,
            window.offset
        );
        let (tickets, events) = futures::try_join!(
            self.clients.tickets.list_by_user(user_id),
            self.clients
                .events
                .list_events(window.fetch_limit(), window.offset),
        )?;

        let (events, page) = window.settle(extract_items(events));
        let data = json!({
            "tickets": extract_items(tickets),
            "events": events,
            "pagination": page,
        });
        let ctx = ResourceContext::new(Resource::UserTickets, Operation::List)
            .with_id(Some(user_id.into()))
            .with_page(page);
        Ok(build(
            Some(data),
            "Tickets and events retrieved successfully",
            &ctx,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::testing::composite;
    use super::*;
    use crate::notify::mock::RecordingNotifier;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn events(n: usize) -> Value {
        Value::Array((0..n).map(|i| json!({ "EID": i })).collect())
    }

    #[tokio::test]
    async fn test_user_tickets_is_union_of_both_calls() {
        let server = MockServer::start().await;
        let tickets = json!([{"TID": 1, "EID": 0}, {"TID": 2, "EID": 1}]);
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(query_param("user_id", "u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tickets.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("limit", "3"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(events(2)))
            .mount(&server)
            .await;

        let env = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .user_tickets("u1", PageWindow::new(2, 0))
            .await
            .unwrap();
        let data = env.data.unwrap();
        assert_eq!(data["tickets"], tickets);
        assert_eq!(data["events"], events(2));
        assert_eq!(data["pagination"]["has_next"], false);
        assert_eq!(data["pagination"]["has_prev"], false);
    }

    #[tokio::test]
    async fn test_user_tickets_detects_next_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": events(3)})))
            .mount(&server)
            .await;

        let env = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .user_tickets("u1", PageWindow::new(2, 4))
            .await
            .unwrap();
        let data = env.data.as_ref().unwrap();
        assert_eq!(data["events"].as_array().unwrap().len(), 2);
        assert_eq!(data["pagination"]["has_next"], true);
        assert_eq!(data["pagination"]["has_prev"], true);
        assert_eq!(
            env.link("next").unwrap().href,
            "/composite/users/u1/tickets?limit=2&offset=6"
        );
    }

    #[tokio::test]
    async fn test_user_tickets_fails_whole_on_one_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(events(1)))
            .mount(&server)
            .await;

        let err = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .user_tickets("u1", PageWindow::new(5, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_create_user_sync_links_new_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"UID": "u9"})))
            .mount(&server)
            .await;

        let created = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .create_user(json!({"email": "a@b.c"}), false)
            .await
            .unwrap();
        let Created::Sync(env) = created else {
            panic!("expected sync create");
        };
        assert_eq!(env.link("self").unwrap().href, "/composite/users/u9");
    }

    #[tokio::test]
    async fn test_create_user_async_returns_before_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"UID": "u9"}))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .create_user(json!({"email": "a@b.c"}), true)
            .await
            .unwrap();
        let Created::Accepted { task_id, envelope } = created else {
            panic!("expected accepted");
        };
        assert_eq!(envelope.data.as_ref().unwrap()["task_id"], task_id.as_str());
        assert!(envelope.link("status").is_none());
        assert_eq!(envelope.link("collection").unwrap().href, "/composite/users");

        // the detached task still reaches the backend
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
