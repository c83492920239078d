//! ISF Playground - Backend Library
//!
//! Repair request and purchase order tracking for care centers, with
//! role-based permissions and offline-aware attachment storage.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
