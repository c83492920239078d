//! Shared Data Transfer Objects (DTOs) for API handlers.
//!
//! Every endpoint responds with the same envelope:
//! `{ success, data | message, pagination? }`. Errors use
//! `{ success: false, code, message }` (see [`crate::error::AppError`]).

use serde::Serialize;
use utoipa::ToSchema;

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    /// Successful paginated list response.
    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response carrying only a message (e.g. after a delete).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

/// Pagination metadata for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
    /// Total number of pages, `ceil(total / limit)`
    pub pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            ((total as f64) / (limit as f64)).ceil() as u32
        };
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Pagination
    // -----------------------------------------------------------------------

    #[test]
    fn test_pagination_rounds_up() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.pages, 3);
    }

    #[test]
    fn test_pagination_exact_division() {
        let p = Pagination::new(1, 10, 30);
        assert_eq!(p.pages, 3);
    }

    #[test]
    fn test_pagination_zero_total() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.pages, 0);
    }

    #[test]
    fn test_pagination_single_item() {
        let p = Pagination::new(1, 10, 1);
        assert_eq!(p.pages, 1);
    }

    // -----------------------------------------------------------------------
    // ApiResponse envelope
    // -----------------------------------------------------------------------

    #[test]
    fn test_ok_envelope_shape() {
        let resp = ApiResponse::ok(vec![1, 2, 3]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert!(json.get("message").is_none());
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_paginated_envelope_shape() {
        let resp = ApiResponse::paginated(vec!["a"], Pagination::new(2, 10, 45));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["pagination"]["total"], 45);
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["limit"], 10);
        assert_eq!(json["pagination"]["pages"], 5);
    }

    #[test]
    fn test_message_envelope_shape() {
        let resp = ApiResponse::message("Role deleted");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Role deleted");
        assert!(json.get("data").is_none());
    }
}
