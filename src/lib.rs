//! Composite Gateway
//!
//! Aggregates independent backend services (user management, event
//! management, ticketing) into unified HATEOAS responses.
//!
//! # Modules
//!
//! - [`auth`] - Bearer credential extraction and role authorization
//! - [`backend`] - Typed per-service HTTP clients
//! - [`gateway`] - Aggregation engine, envelopes, handlers and router
//! - [`notify`] - Fire-and-forget email and broadcast notifications
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup

pub mod auth;
pub mod backend;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod notify;

pub use config::AppConfig;
pub use gateway::error::GatewayError;
pub use gateway::state::AppState;
pub use gateway::types::{Envelope, Link, PaginationState};
