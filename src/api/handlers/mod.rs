//! API request handlers.

pub mod auth;
pub mod health;
pub mod overview;
pub mod purchase_orders;
pub mod repair_requests;
pub mod roles;
pub mod upload;
