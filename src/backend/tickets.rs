//! Ticketing service calls.

use reqwest::Method;
use serde_json::Value;

use super::{BackendClient, BackendError};
use crate::gateway::types::PageWindow;

#[derive(Clone)]
pub struct TicketService {
    client: BackendClient,
}

impl TicketService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Value, BackendError> {
        let req = self
            .client
            .request(Method::GET, "/tickets")
            .query("user_id", user_id);
        self.client.execute(req).await
    }

    /// Tickets for one event. `None` fetches every ticket.
    pub async fn list_by_event(
        &self,
        event_id: &str,
        window: Option<PageWindow>,
    ) -> Result<Value, BackendError> {
        let mut req = self
            .client
            .request(Method::GET, "/tickets")
            .query("event_id", event_id);
        if let Some(w) = window {
            req = req.query("limit", w.fetch_limit()).query("offset", w.offset);
        }
        self.client.execute(req).await
    }

    pub async fn book_ticket(&self, booking: &Value) -> Result<Value, BackendError> {
        self.client.post("/tickets", booking).await
    }

    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Value, BackendError> {
        self.client.get(&format!("/tickets/{ticket_id}")).await
    }

    pub async fn cancel_ticket(&self, ticket_id: &str) -> Result<Value, BackendError> {
        self.client.delete(&format!("/tickets/{ticket_id}")).await
    }

    pub async fn health(&self) -> Result<Value, BackendError> {
        self.client.health().await
    }
}
