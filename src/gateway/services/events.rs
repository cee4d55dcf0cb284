//! Event composite operations.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use serde_json::{Value, json};

use super::tasks::spawn_detached;
use super::{
    CompositeService, Created, EVENT_ID_KEYS, USER_ID_KEYS, extract_items, resource_id,
};
use crate::gateway::error::GatewayError;
use crate::gateway::types::{Envelope, Operation, PageWindow, Resource, ResourceContext, build};
use crate::notify::Channel;

impl CompositeService {
    pub async fn list_events(&self, window: PageWindow) -> Result<Envelope, GatewayError> {
        let listing = self
            .clients
            .events
            .list_events(window.fetch_limit(), window.offset)
            .await?;
        let (items, page) = window.settle(extract_items(listing));
        let data = json!({ "items": items, "pagination": page });
        let ctx = ResourceContext::new(Resource::Event, Operation::List).with_page(page);
        Ok(build(Some(data), "Events retrieved successfully", &ctx))
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Envelope, GatewayError> {
        let event = self.clients.events.get_event(event_id).await?;
        let ctx =
            ResourceContext::new(Resource::Event, Operation::Read).with_id(Some(event_id.into()));
        Ok(build(Some(event), "Event retrieved successfully", &ctx))
    }

    pub async fn create_event(
        &self,
        event: Value,
        async_create: bool,
    ) -> Result<Created, GatewayError> {
        tracing::info!("[ENGINE] create_event async={}", async_create);
        if async_create {
            let events = self.clients.events.clone();
            let task_id =
                spawn_detached("create_event", async move { events.create_event(&event).await });
            let ctx = ResourceContext::new(Resource::Event, Operation::Accepted);
            let envelope = build(
                Some(json!({ "task_id": task_id })),
                "Event creation accepted",
                &ctx,
            );
            return Ok(Created::Accepted { task_id, envelope });
        }

        let created = self.clients.events.create_event(&event).await?;
        let ctx = ResourceContext::new(Resource::Event, Operation::Create)
            .with_id(resource_id(&created, EVENT_ID_KEYS));
        Ok(Created::Sync(build(
            Some(created),
            "Event created successfully",
            &ctx,
        )))
    }

    /// Update, then tell attendees.
    ///
    /// Steps run strictly in order and any failure aborts the rest: update the
    /// event, list its tickets, resolve each attendee's email, notify.
    /// Completed steps are not rolled back.
    pub async fn update_event(&self, event_id: &str, event: Value) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] update_event {}", event_id);
        let updated = self.clients.events.update_event(event_id, &event).await?;
        let updated_id = resource_id(&updated, EVENT_ID_KEYS).unwrap_or_else(|| event_id.into());

        let tickets = self.clients.tickets.list_by_event(&updated_id, None).await?;
        let attendees: BTreeSet<String> = extract_items(tickets)
            .iter()
            .filter_map(|t| resource_id(t, USER_ID_KEYS))
            .collect();

        let users = try_join_all(attendees.iter().map(|uid| self.clients.users.get_user(uid))).await?;
        let recipients: Vec<String> = users
            .iter()
            .filter_map(|u| {
                u.get("email")
                    .or_else(|| u.get("Email"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect();

        tracing::info!(
            "[ENGINE] event {} updated, notifying {} attendees",
            updated_id,
            recipients.len()
        );
        if !recipients.is_empty() {
            self.notifier.notify_async(
                Channel::Email,
                json!({
                    "recipients": recipients,
                    "subject": "Event updated",
                    "event": updated,
                }),
            );
        }
        self.notifier.notify_async(
            Channel::Broadcast,
            json!({ "event_id": updated_id, "event": updated }),
        );

        let ctx = ResourceContext::new(Resource::Event, Operation::Update).with_id(Some(updated_id));
        Ok(build(Some(updated), "Event updated successfully", &ctx))
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] delete_event {}", event_id);
        self.clients.events.delete_event(event_id).await?;
        let ctx =
            ResourceContext::new(Resource::Event, Operation::Delete).with_id(Some(event_id.into()));
        Ok(build(None, "Event deleted successfully", &ctx))
    }

    /// One page of the tickets booked for an event.
    pub async fn event_tickets(
        &self,
        event_id: &str,
        window: PageWindow,
    ) -> Result<Envelope, GatewayError> {
        let listing = self
            .clients
            .tickets
            .list_by_event(event_id, Some(window))
            .await?;
        let (items, page) = window.settle(extract_items(listing));
        let data = json!({ "items": items, "pagination": page });
        let ctx = ResourceContext::new(Resource::EventTickets, Operation::List)
            .with_id(Some(event_id.into()))
            .with_page(page);
        Ok(build(Some(data), "Event tickets retrieved successfully", &ctx))
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

    #[tokio::test]
    async fn test_list_events_never_exceeds_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("limit", "4"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"EID": 1}, {"EID": 2}, {"EID": 3}, {"EID": 4}
            ])))
            .mount(&server)
            .await;

        let env = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .list_events(PageWindow::new(3, 0))
            .await
            .unwrap();
        let data = env.data.as_ref().unwrap();
        assert_eq!(data["items"].as_array().unwrap().len(), 3);
        assert_eq!(data["pagination"]["has_next"], true);
        assert!(env.link("prev").is_none());
        assert_eq!(env.link("next").unwrap().href, "/composite/events?limit=3&offset=3");
    }

    #[tokio::test]
    async fn test_update_event_notifies_attendees() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/events/e1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"EID": "e1", "Name": "Gala"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(query_param("event_id", "e1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"TID": 1, "UID": "u1"},
                {"TID": 2, "UID": "u2"},
                {"TID": 3, "UID": "u1"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "u1@x.io"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/u2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "u2@x.io"})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let env = composite(&server.uri(), notifier.clone())
            .update_event("e1", json!({"Name": "Gala"}))
            .await
            .unwrap();
        assert_eq!(env.message, "Event updated successfully");
        assert!(env.link("modify").is_none());

        tokio::time::timeout(Duration::from_secs(2), notifier.wait_for(2))
            .await
            .unwrap();
        let sent = notifier.sent();
        let (_, email) = sent.iter().find(|(c, _)| *c == Channel::Email).unwrap();
        assert_eq!(email["recipients"], json!(["u1@x.io", "u2@x.io"]));
        assert!(sent.iter().any(|(c, _)| *c == Channel::Broadcast));
    }

    #[tokio::test]
    async fn test_update_event_aborts_chain_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/events/e1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"EID": "e1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/u1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let err = composite(&server.uri(), notifier.clone())
            .update_event("e1", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { status: 500, .. }));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_create_event_async_accepts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"EID": 5})))
            .mount(&server)
            .await;

        let created = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .create_event(json!({"Name": "Gala"}), true)
            .await
            .unwrap();
        assert!(matches!(created, Created::Accepted { .. }));
    }

    #[tokio::test]
    async fn test_event_tickets_paginates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .and(query_param("event_id", "e1"))
            .and(query_param("limit", "3"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"TID": 1}])))
            .mount(&server)
            .await;

        let env = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .event_tickets("e1", PageWindow::new(2, 2))
            .await
            .unwrap();
        let data = env.data.as_ref().unwrap();
        assert_eq!(data["pagination"]["has_next"], false);
        assert_eq!(data["pagination"]["has_prev"], true);
        assert_eq!(env.link("event").unwrap().href, "/composite/events/e1");
    }
}
