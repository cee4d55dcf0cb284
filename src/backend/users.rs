//! User-management service calls (users and organizers).

use serde_json::Value;
use std::collections::HashMap;

use super::{BackendClient, BackendError};
use reqwest::Method;

#[derive(Clone)]
pub struct UserService {
    client: BackendClient,
}

impl UserService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Value, BackendError> {
        self.client.get(&format!("/user/{user_id}")).await
    }

    pub async fn create_user(&self, user: &Value) -> Result<Value, BackendError> {
        self.client.post("/user", user).await
    }

    /// The backend identifies the user from the `UID` field of the body.
    pub async fn modify_user(&self, user_id: &str, user: &Value) -> Result<Value, BackendError> {
        self.client.put("/user", &with_id(user, "UID", user_id)).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<Value, BackendError> {
        self.client.delete(&format!("/user/{user_id}")).await
    }

    /// Login is a form post on the backend.
    pub async fn authenticate_user(
        &self,
        form: HashMap<String, String>,
    ) -> Result<Value, BackendError> {
        let req = self.client.request(Method::POST, "/user/authenticate").form(form);
        self.client.execute(req).await
    }

    pub async fn get_organizer(&self, organizer_id: &str) -> Result<Value, BackendError> {
        self.client.get(&format!("/organiser/{organizer_id}")).await
    }

    pub async fn get_organizer_by_email(&self, email: &str) -> Result<Value, BackendError> {
        let req = self
            .client
            .request(Method::GET, "/organiser")
            .query("email", email);
        self.client.execute(req).await
    }

    pub async fn create_organizer(&self, organizer: &Value) -> Result<Value, BackendError> {
        self.client.post("/organiser", organizer).await
    }

    pub async fn modify_organizer(
        &self,
        organizer_id: &str,
        organizer: &Value,
    ) -> Result<Value, BackendError> {
        self.client
            .put("/organiser", &with_id(organizer, "OID", organizer_id))
            .await
    }

    pub async fn delete_organizer(&self, organizer_id: &str) -> Result<Value, BackendError> {
        self.client.delete(&format!("/organiser/{organizer_id}")).await
    }

    pub async fn authenticate_organizer(
        &self,
        form: HashMap<String, String>,
    ) -> Result<Value, BackendError> {
        let req = self
            .client
            .request(Method::POST, "/organiser/authenticate")
            .form(form);
        self.client.execute(req).await
    }

    pub async fn health(&self) -> Result<Value, BackendError> {
        self.client.health().await
    }
}

/// Copy of `body` with `key` set to `id`. Non-object bodies are replaced.
fn with_id(body: &Value, key: &str, id: &str) -> Value {
    let mut body = match body {
        Value::Object(_) => body.clone(),
        _ => Value::Object(Default::default()),
    };
    body[key] = Value::String(id.to_string());
    body
}
