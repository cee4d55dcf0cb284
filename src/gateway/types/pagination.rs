//! Pagination types
//!
//! The gateway asks backends for one item more than requested; the presence
//! of that extra item is the only signal for `has_next`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// List query parameters. Accepts either `limit`/`offset` or `page`/`size`.
#[derive(Debug, Default, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Max items to return (1..=100)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    /// Items to skip
    pub offset: Option<u32>,
    /// 1-based page number
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    /// Page size (1..=100)
    #[validate(range(min = 1, max = 100))]
    pub size: Option<u32>,
}

impl PageQuery {
    /// Normalize to a limit/offset window. `page`/`size` win when present.
    pub fn window(&self) -> Result<PageWindow, String> {
        self.validate().map_err(|e| format!("Invalid pagination: {}", e))?;

        if self.page.is_some() || self.size.is_some() {
            let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
            let page = self.page.unwrap_or(1);
            return Ok(PageWindow {
                limit: size,
                offset: (page - 1).saturating_mul(size),
            });
        }

        Ok(PageWindow {
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: self.offset.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u32,
    pub offset: u32,
}

impl PageWindow {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Number of items to request from the backend.
    pub fn fetch_limit(&self) -> u32 {
        self.limit.saturating_add(1)
    }

    /// Truncate an over-fetched list and derive the pagination flags.
    pub fn settle(&self, mut items: Vec<Value>) -> (Vec<Value>, PaginationState) {
        let limit = self.limit as usize;
        let has_next = items.len() > limit;
        items.truncate(limit);
        let state = PaginationState {
            limit: self.limit,
            offset: self.offset,
            has_next,
            has_prev: self.offset > 0,
        };
        (items, state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationState {
    pub limit: u32,
    pub offset: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationState {
    pub fn next_offset(&self) -> u32 {
        self.offset.saturating_add(self.limit)
    }

    pub fn prev_offset(&self) -> u32 {
        self.offset.saturating_sub(self.limit)
    }
}
