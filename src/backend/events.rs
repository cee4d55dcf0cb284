//! Event-management service calls.

use reqwest::Method;
use serde_json::Value;

use super::{BackendClient, BackendError};

#[derive(Clone)]
pub struct EventService {
    client: BackendClient,
}

impl EventService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub async fn list_events(&self, limit: u32, offset: u32) -> Result<Value, BackendError> {
        let req = self
            .client
            .request(Method::GET, "/events")
            .query("limit", limit)
            .query("offset", offset);
        self.client.execute(req).await
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Value, BackendError> {
        self.client.get(&format!("/events/{event_id}")).await
    }

    pub async fn create_event(&self, event: &Value) -> Result<Value, BackendError> {
        self.client.post("/events", event).await
    }

    pub async fn update_event(&self, event_id: &str, event: &Value) -> Result<Value, BackendError> {
        self.client.put(&format!("/events/{event_id}"), event).await
    }

    /// Partial update, used for the remaining-capacity counter.
    pub async fn patch_event(&self, event_id: &str, fields: &Value) -> Result<Value, BackendError> {
        self.client.patch(&format!("/events/{event_id}"), fields).await
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<Value, BackendError> {
        self.client.delete(&format!("/events/{event_id}")).await
    }

    pub async fn health(&self) -> Result<Value, BackendError> {
        self.client.health().await
    }
}
