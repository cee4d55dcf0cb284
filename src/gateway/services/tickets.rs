//! Ticket composite operations: guarded booking and cancel.

use serde_json::{Value, json};

use super::{
    CompositeService, EVENT_ID_KEYS, TICKET_ID_KEYS, USER_ID_KEYS, int_field, resource_id,
};
use crate::auth::Claims;
use crate::gateway::error::GatewayError;
use crate::gateway::types::{Envelope, Operation, Resource, ResourceContext, build};
use crate::notify::Channel;

pub const CAPACITY_FIELD: &str = "GuestsRem";
pub const SEATS_FIELD: &str = "Guests";

impl CompositeService {
    /// Book seats on an event.
    ///
    /// Capacity is read, checked and patched before the ticket is created.
    /// The read-then-patch is not atomic against concurrent bookings.
    pub async fn book_ticket(
        &self,
        claims: &Claims,
        mut booking: Value,
    ) -> Result<Envelope, GatewayError> {
        let event_id = resource_id(&booking, EVENT_ID_KEYS)
            .ok_or_else(|| GatewayError::BadRequest("Booking must reference an event (EID)".into()))?;
        let seats = match booking.get(SEATS_FIELD) {
            None | Some(Value::Null) => 1,
            Some(_) => int_field(&booking, SEATS_FIELD)
                .filter(|n| *n >= 1)
                .ok_or_else(|| GatewayError::BadRequest("Guests must be a positive integer".into()))?,
        };

        tracing::info!(
            "[ENGINE] book_ticket event={} seats={} by {}",
            event_id,
            seats,
            claims.sub
        );
        let event = self.clients.events.get_event(&event_id).await?;
        let remaining = int_field(&event, CAPACITY_FIELD).ok_or_else(|| {
            GatewayError::Unexpected(format!("event {event_id} carries no {CAPACITY_FIELD}"))
        })?;
        let new_remaining = remaining - seats;
        if new_remaining < 0 {
            tracing::info!(
                "[ENGINE] booking rejected: event {} has {} seats, {} requested",
                event_id,
                remaining,
                seats
            );
            return Err(GatewayError::InvalidState(
                "Not enough guests remaining".into(),
            ));
        }

        self.clients
            .events
            .patch_event(&event_id, &json!({ CAPACITY_FIELD: new_remaining }))
            .await?;

        if let Value::Object(map) = &mut booking {
            map.entry("UID").or_insert_with(|| Value::String(claims.sub.clone()));
        }
        let ticket = self.clients.tickets.book_ticket(&booking).await?;

        if let Some(email) = &claims.email {
            self.notifier.notify_async(
                Channel::Email,
                json!({
                    "recipients": [email],
                    "subject": "Booking confirmed",
                    "ticket": ticket,
                }),
            );
        }

        let ctx = ResourceContext::new(Resource::Ticket, Operation::Create)
            .with_id(resource_id(&ticket, TICKET_ID_KEYS));
        Ok(build(Some(ticket), "Ticket booked successfully", &ctx))
    }

    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Envelope, GatewayError> {
        let ticket = self.clients.tickets.get_ticket(ticket_id).await?;
        let ctx =
            ResourceContext::new(Resource::Ticket, Operation::Read).with_id(Some(ticket_id.into()));
        Ok(build(Some(ticket), "Ticket retrieved successfully", &ctx))
    }

    /// Cancel a ticket and give its seats back to the event.
    pub async fn cancel_ticket(&self, ticket_id: &str) -> Result<Envelope, GatewayError> {
        tracing::info!("[ENGINE] cancel_ticket {}", ticket_id);
        let ticket = self.clients.tickets.get_ticket(ticket_id).await?;
        self.clients.tickets.cancel_ticket(ticket_id).await?;

        if let Some(event_id) = resource_id(&ticket, EVENT_ID_KEYS) {
            let seats = int_field(&ticket, SEATS_FIELD).unwrap_or(1);
            let event = self.clients.events.get_event(&event_id).await?;
            let remaining = int_field(&event, CAPACITY_FIELD).unwrap_or(0);
            self.clients
                .events
                .patch_event(&event_id, &json!({ CAPACITY_FIELD: remaining + seats }))
                .await?;
        } else {
            tracing::warn!("[ENGINE] ticket {} has no event, capacity not restored", ticket_id);
        }

        let data = json!({
            "TID": ticket_id,
            "UID": resource_id(&ticket, USER_ID_KEYS),
        });
        let ctx = ResourceContext::new(Resource::Ticket, Operation::Delete)
            .with_id(Some(ticket_id.into()));
        Ok(build(Some(data), "Ticket canceled successfully", &ctx))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::testing::composite;
    use super::*;
    use crate::notify::mock::RecordingNotifier;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn claims() -> Claims {
        Claims {
            sub: "u1".into(),
            role: "user".into(),
            email: Some("u1@x.io".into()),
            exp: 0,
            iat: 0,
        }
    }

    async fn event_with_capacity(server: &MockServer, remaining: i64) {
        Mock::given(method("GET"))
            .and(path("/events/e1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"EID": "e1", "GuestsRem": remaining})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_overbooking_never_patches() {
        let server = MockServer::start().await;
        event_with_capacity(&server, 2).await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tickets"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .book_ticket(&claims(), json!({"EID": "e1", "Guests": 3}))
            .await
            .unwrap_err();
        match err {
            GatewayError::InvalidState(msg) => assert_eq!(msg, "Not enough guests remaining"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_booking_patches_then_creates_and_emails() {
        let server = MockServer::start().await;
        event_with_capacity(&server, 5).await;
        Mock::given(method("PATCH"))
            .and(path("/events/e1"))
            .and(body_json(json!({"GuestsRem": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"GuestsRem": 3})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tickets"))
            .and(body_json(json!({"EID": "e1", "Guests": 2, "UID": "u1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"TID": 77})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let env = composite(&server.uri(), notifier.clone())
            .book_ticket(&claims(), json!({"EID": "e1", "Guests": 2}))
            .await
            .unwrap();
        assert_eq!(env.link("self").unwrap().href, "/composite/ticket/77");
        assert_eq!(env.link("cancel").unwrap().method, "DELETE");

        tokio::time::timeout(Duration::from_secs(2), notifier.wait_for(1))
            .await
            .unwrap();
        assert_eq!(notifier.sent()[0].1["recipients"], json!(["u1@x.io"]));
    }

    #[tokio::test]
    async fn test_booking_rejects_bad_seat_count() {
        let server = MockServer::start().await;
        let svc = composite(&server.uri(), Arc::new(RecordingNotifier::default()));

        for booking in [json!({"EID": "e1", "Guests": 0}), json!({"Guests": 1})] {
            let err = svc.book_ticket(&claims(), booking).await.unwrap_err();
            assert!(matches!(err, GatewayError::BadRequest(_)));
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    async fn deletable_ticket(server: &MockServer, ticket: Value) {
        Mock::given(method("GET"))
            .and(path("/tickets/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ticket))
            .mount(server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/tickets/t1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_cancel_without_event_skips_capacity() {
        let server = MockServer::start().await;
        deletable_ticket(&server, json!({"TID": "t1", "UID": "u1"})).await;
        Mock::given(method("GET"))
            .and(path("/events/e1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let env = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .cancel_ticket("t1")
            .await
            .unwrap();
        let data = env.data.unwrap();
        assert_eq!(data["TID"], "t1");
        assert_eq!(data["UID"], "u1");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_without_guests_restores_one_seat() {
        let server = MockServer::start().await;
        deletable_ticket(&server, json!({"TID": "t1", "EID": "e1", "UID": "u1"})).await;
        event_with_capacity(&server, 4).await;
        Mock::given(method("PATCH"))
            .and(path("/events/e1"))
            .and(body_json(json!({"GuestsRem": 5})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .cancel_ticket("t1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_surfaces_failed_capacity_restore() {
        let server = MockServer::start().await;
        deletable_ticket(
            &server,
            json!({"TID": "t1", "EID": "e1", "UID": "u1", "Guests": 2}),
        )
        .await;
        event_with_capacity(&server, 1).await;
        Mock::given(method("PATCH"))
            .and(path("/events/e1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("event store down"))
            .expect(1)
            .mount(&server)
            .await;

        // ticket stays deleted; the failed restore is reported as-is
        let err = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .cancel_ticket("t1")
            .await
            .unwrap_err();
        match err {
            GatewayError::Upstream { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "event store down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_restores_capacity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets/t1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"TID": "t1", "EID": "e1", "UID": "u1", "Guests": 2})),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/tickets/t1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        event_with_capacity(&server, 1).await;
        Mock::given(method("PATCH"))
            .and(path("/events/e1"))
            .and(body_json(json!({"GuestsRem": 3})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let env = composite(&server.uri(), Arc::new(RecordingNotifier::default()))
            .cancel_ticket("t1")
            .await
            .unwrap();
        assert_eq!(env.links.len(), 1);
        assert_eq!(env.links[0].rel, "book_new");
    }
}
