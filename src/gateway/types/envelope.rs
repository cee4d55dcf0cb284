//! Response Envelope Builder
//!
//! Every composite operation answers with one [`Envelope`]:
//! - `data`: aggregated payload (opaque JSON) or null
//! - `message`: human readable outcome
//! - `links`: next actions valid for the resulting resource state
//!
//! Links are derived from the operation kind and the resulting identifier.
//! Building never fails: identifier-dependent links are omitted when no id
//! is known.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::pagination::PaginationState;

pub const PREFIX: &str = "/composite";

/// HATEOAS link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    #[schema(example = "self")]
    pub rel: String,
    #[schema(example = "/composite/events/42")]
    pub href: String,
    #[schema(example = "GET")]
    pub method: String,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>, method: &str) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            method: method.to_string(),
        }
    }
}

/// Uniform response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope {
    #[schema(value_type = Object)]
    pub data: Option<Value>,
    #[schema(example = "Event retrieved successfully")]
    pub message: String,
    pub links: Vec<Link>,
}

impl Envelope {
    /// Envelope without payload or links (used for errors).
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            links: Vec::new(),
        }
    }

    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == rel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Organizer,
    Event,
    Ticket,
    /// A user's tickets joined with the event listing
    UserTickets,
    /// Tickets booked for one event
    EventTickets,
    Health { healthy: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
    /// Async mutation accepted; `id` is the task id
    Accepted,
}

/// What the builder needs to know about the outcome.
#[derive(Debug, Clone)]
pub struct ResourceContext {
    pub resource: Resource,
    pub operation: Operation,
    pub id: Option<String>,
    pub page: Option<PaginationState>,
}

impl ResourceContext {
    pub fn new(resource: Resource, operation: Operation) -> Self {
        Self {
            resource,
            operation,
            id: None,
            page: None,
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn with_page(mut self, page: PaginationState) -> Self {
        self.page = Some(page);
        self
    }
}

pub fn build(data: Option<Value>, message: impl Into<String>, ctx: &ResourceContext) -> Envelope {
    Envelope {
        data,
        message: message.into(),
        links: links_for(ctx),
    }
}

pub fn task_href(task_id: &str) -> String {
    format!("{PREFIX}/tasks/{task_id}")
}

fn collection(resource: Resource) -> &'static str {
    match resource {
        Resource::User | Resource::UserTickets => "/composite/users",
        Resource::Organizer => "/composite/organizer",
        Resource::Event | Resource::EventTickets => "/composite/events",
        Resource::Ticket => "/composite/ticket",
        Resource::Health { .. } => "/composite/health",
    }
}

/// Deterministic link set for an operation outcome.
pub fn links_for(ctx: &ResourceContext) -> Vec<Link> {
    use Operation::*;
    use Resource::*;

    let base = collection(ctx.resource);
    let item = ctx.id.as_deref().map(|id| format!("{base}/{id}"));
    let mut links = Vec::new();

    match (ctx.resource, ctx.operation) {
        (Health { healthy }, _) => {
            links.push(Link::new("self", base, "GET"));
            if healthy {
                links.push(Link::new("users", "/composite/users", "GET"));
                links.push(Link::new("events", "/composite/events", "GET"));
                links.push(Link::new("ticket", "/composite/ticket", "GET"));
            }
        }
        // task id travels in `data` and the Location header; no route serves it
        (_, Accepted) => {
            links.push(Link::new("collection", base, "GET"));
        }
        (_, Delete) => {
            let rel = if ctx.resource == Ticket { "book_new" } else { "create" };
            links.push(Link::new(rel, base, "POST"));
        }
        (Ticket, _) => {
            if let Some(href) = &item {
                links.push(Link::new("self", href, "GET"));
                links.push(Link::new("cancel", href, "DELETE"));
            }
            links.push(Link::new("book_new", base, "POST"));
        }
        (Event, List) => {
            links.push(Link::new("self", page_href(base, ctx.page), "GET"));
            links.push(Link::new("create", base, "POST"));
            push_page_links(&mut links, base, ctx.page);
        }
        (UserTickets | EventTickets, _) => {
            if let Some(href) = &item {
                links.push(Link::new(
                    "self",
                    page_href(&format!("{href}/tickets"), ctx.page),
                    "GET",
                ));
                let owner = if ctx.resource == UserTickets { "user" } else { "event" };
                links.push(Link::new(owner, href, "GET"));
                push_page_links(&mut links, &format!("{href}/tickets"), ctx.page);
            }
        }
        (User | Organizer | Event, op) => match &item {
            Some(href) => {
                links.push(Link::new("self", href, "GET"));
                if op != Update {
                    links.push(Link::new("modify", href, "PUT"));
                }
                links.push(Link::new("delete", href, "DELETE"));
                if matches!(ctx.resource, User | Event) {
                    links.push(Link::new("tickets", format!("{href}/tickets"), "GET"));
                }
            }
            // Organizer self-lookup resolves by token, not by id
            None if ctx.resource == Organizer && op == Read => {
                links.push(Link::new("self", base, "GET"));
            }
            None => {}
        },
    }

    links
}

fn page_href(base: &str, page: Option<PaginationState>) -> String {
    match page {
        Some(p) => format!("{base}?limit={}&offset={}", p.limit, p.offset),
        None => base.to_string(),
    }
}

fn push_page_links(links: &mut Vec<Link>, base: &str, page: Option<PaginationState>) {
    let Some(p) = page else { return };
    if p.has_next {
        links.push(Link::new(
            "next",
            format!("{base}?limit={}&offset={}", p.limit, p.next_offset()),
            "GET",
        ));
    }
    if p.has_prev {
        links.push(Link::new(
            "prev",
            format!("{base}?limit={}&offset={}", p.limit, p.prev_offset()),
            "GET",
        ));
    }
}
