//! HTTP delivery for notifications.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Channel, Notifier, NotifyError};
use crate::config::NotificationConfig;

pub struct HttpNotifier {
    http: reqwest::Client,
    email_trigger_url: Option<String>,
    publish_url: Option<String>,
    topic: String,
}

impl HttpNotifier {
    pub fn new(http: reqwest::Client, config: &NotificationConfig) -> Self {
        Self {
            http,
            email_trigger_url: config.email_trigger_url.clone(),
            publish_url: config.publish_url.clone(),
            topic: config.topic.clone(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, channel: Channel, payload: Value) -> Result<(), NotifyError> {
        let (url, body) = match channel {
            Channel::Email => (self.email_trigger_url.as_deref(), payload),
            Channel::Broadcast => (
                self.publish_url.as_deref(),
                json!({ "topic": self.topic, "message": payload }),
            ),
        };
        let url = url.ok_or(NotifyError::NotConfigured(channel.as_str()))?;

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Delivery(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }
}
