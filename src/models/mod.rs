//! Database entity models.

pub mod attachment;
pub mod purchase_order;
pub mod repair_request;
pub mod role;
pub mod status;
pub mod user;
