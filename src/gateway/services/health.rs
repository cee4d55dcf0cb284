//! Aggregated backend health.

use serde_json::{Map, Value, json};

use super::CompositeService;
use crate::backend::BackendError;
use crate::gateway::types::{Envelope, Operation, Resource, ResourceContext, build};

impl CompositeService {
    /// Probe all backends concurrently. Never fails: an unreachable backend
    /// shows up as an error entry and flips the top-level status.
    pub async fn health(&self) -> Envelope {
        let (users, events, tickets) = tokio::join!(
            self.clients.users.health(),
            self.clients.events.health(),
            self.clients.tickets.health(),
        );

        let mut data = Map::new();
        let mut healthy = true;
        for (key, probe) in [
            ("user_management", users),
            ("event_management", events),
            ("ticketing", tickets),
        ] {
            healthy &= probe.is_ok();
            data.insert(key.to_string(), probe_entry(key, probe));
        }
        data.insert(
            "status".to_string(),
            Value::from(if healthy { "ok" } else { "error" }),
        );

        let message = if healthy {
            "All services are healthy"
        } else {
            "One or more services are unhealthy"
        };
        let ctx = ResourceContext::new(Resource::Health { healthy }, Operation::Read);
        build(Some(Value::Object(data)), message, &ctx)
    }
}

fn probe_entry(name: &str, probe: Result<Value, BackendError>) -> Value {
    match probe {
        Ok(Value::Null) => json!({ "status": "ok" }),
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("[HEALTH] {} probe failed: {}", name, e);
            let details = match e {
                BackendError::Status { body, .. } => body,
                other => other.to_string(),
            };
            json!({ "status": "error", "details": details })
        }
    }
}
