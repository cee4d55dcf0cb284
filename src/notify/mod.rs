//! Notification Dispatch
//!
//! Best-effort side effects of a completed composite operation. Two channels:
//! - [`Channel::Email`]: direct trigger of a transactional email
//! - [`Channel::Broadcast`]: publish to every subscriber of a topic
//!
//! [`NotificationDispatcher::notify_async`] never blocks the caller and never
//! reports failure back to it.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Broadcast,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Broadcast => "broadcast",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel: Channel, payload: Value) -> Result<(), NotifyError>;
}

/// Fire-and-forget front of a [`Notifier`].
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Spawn delivery and return immediately. The task owns `payload`.
    pub fn notify_async(&self, channel: Channel, payload: Value) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            match notifier.send(channel, payload).await {
                Ok(()) => tracing::debug!("[NOTIFY] {} delivered", channel.as_str()),
                Err(NotifyError::NotConfigured(c)) => {
                    tracing::info!("[NOTIFY] {} channel disabled, skipped", c)
                }
                Err(e) => tracing::warn!("[NOTIFY] {} failed: {}", channel.as_str(), e),
            }
        });
    }
}

/// Test notifiers
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Records every delivery; optionally fails all of them.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(Channel, Value)>>,
        pub fail: bool,
        delivered: Notify,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<(Channel, Value)> {
            self.sent.lock().unwrap().clone()
        }

        /// Wait until at least `n` deliveries were attempted.
        pub async fn wait_for(&self, n: usize) {
            loop {
                let notified = self.delivered.notified();
                if self.sent.lock().unwrap().len() >= n {
                    return;
                }
                notified.await;
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, channel: Channel, payload: Value) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push((channel, payload));
            self.delivered.notify_waiters();
            if self.fail {
                return Err(NotifyError::Delivery("mock failure".into()));
            }
            Ok(())
        }
    }
}
