//! Business services.

pub mod attachment_service;
pub mod auth_service;
pub mod overview_service;
pub mod purchase_service;
pub mod repair_service;
pub mod role_service;

/// List page parameters with a whitelisted sort column, shared by the record
/// stores.
#[derive(Debug, Clone)]
pub struct ListPage {
    pub limit: i64,
    pub offset: i64,
    pub sort: String,
    pub descending: bool,
}

impl ListPage {
    /// Build an ORDER BY clause, falling back to `created_at` when the
    /// requested column is not in the whitelist. Column names are never
    /// interpolated from raw input.
    pub fn order_clause(&self, allowed: &[&str]) -> String {
        let column = if allowed.contains(&self.sort.as_str()) {
            self.sort.as_str()
        } else {
            "created_at"
        };
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("ORDER BY r.{} {}", column, direction)
    }
}
