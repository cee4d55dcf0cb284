//! Gateway types module
//!
//! - [`envelope`]: uniform `{data, message, links}` body and link derivation
//! - [`pagination`]: list query parsing and over-fetch pagination state

pub mod envelope;
pub mod pagination;

use serde::Deserialize;
use utoipa::IntoParams;

pub use envelope::{Envelope, Link, Operation, Resource, ResourceContext, build};
pub use pagination::{PageQuery, PageWindow, PaginationState};

/// `?async_create=true` defers the backend mutation past the response.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateQuery {
    #[serde(default)]
    pub async_create: bool,
}
