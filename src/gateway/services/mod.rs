//! Aggregation Engine
//!
//! Each composite operation is an explicit recipe of backend calls plus local
//! combination logic. Handlers stay thin HTTP adapters and delegate here.
//!
//! - [`users`]: user CRUD, login passthrough, tickets+events fan-out join
//! - [`events`]: listing, CRUD, update → notify chain, attendee listing
//! - [`tickets`]: guarded booking and capacity-restoring cancel
//! - [`organizer`]: organizer CRUD and self lookup
//! - [`health`]: concurrent probes that never fail
//! - [`tasks`]: detached execution for async-accepted mutations

pub mod events;
pub mod health;
pub mod organizer;
pub mod tasks;
pub mod tickets;
pub mod users;

use serde_json::Value;

use crate::backend::ServiceClients;
use crate::gateway::types::Envelope;
use crate::notify::NotificationDispatcher;

pub const USER_ID_KEYS: &[&str] = &["UID", "user_id"];
pub const EVENT_ID_KEYS: &[&str] = &["EID", "event_id"];
pub const TICKET_ID_KEYS: &[&str] = &["TID", "ticket_id"];
pub const ORGANIZER_ID_KEYS: &[&str] = &["OID", "organizer_id", "organiser_id"];

/// Per-request engine: backend clients bound to the caller's credential plus
/// the notification side channel.
#[derive(Clone)]
pub struct CompositeService {
    clients: ServiceClients,
    notifier: NotificationDispatcher,
}

/// Outcome of a create that may have been deferred.
#[derive(Debug)]
pub enum Created {
    /// Backend call completed; 201
    Sync(Envelope),
    /// Backend call scheduled; 202 with a task reference
    Accepted { task_id: String, envelope: Envelope },
}

impl CompositeService {
    pub fn new(clients: ServiceClients, notifier: NotificationDispatcher) -> Self {
        Self { clients, notifier }
    }
}

/// First identifier found under `keys`. Numbers are rendered as strings.
pub fn resource_id(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match value.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Integer field that may arrive as a number or a numeric string.
pub fn int_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Backend list payloads are a bare array or wrapped under `items`/`data`.
pub fn extract_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["items", "data"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            tracing::warn!("[ENGINE] list payload without items, treating as empty");
            Vec::new()
        }
        _ => Vec::new(),
    }
}
