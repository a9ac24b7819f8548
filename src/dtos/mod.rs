pub mod applicationdtos;
pub mod jobdtos;
pub mod paymentdtos;
pub mod ratingdtos;
pub mod userdtos;

use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

//Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PaginationQuery {
    /// `page` is at least 1 and `limit` is clamped to 1..=100.
    pub fn resolve(&self) -> PageRequest {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        PageRequest {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total: i64, returned: usize) -> Self {
        let total_pages = (total + request.limit - 1) / request.limit;
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_more: request.offset + (returned as i64) < total,
        }
    }
}

/// First validation message, by field name, for a 400 response.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by_key(|(field, _)| **field);

    fields
        .into_iter()
        .flat_map(|(field, errors)| errors.iter().map(move |error| (field, error)))
        .map(|(field, error)| match &error.message {
            Some(message) => message.to_string(),
            None => format!("Invalid value for {}", field),
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}
