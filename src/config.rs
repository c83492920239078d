//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Log level
    pub log_level: String,

    /// Storage backend for remote attachments: "filesystem" or "s3"
    pub storage_backend: String,

    /// Filesystem storage path (local/offline attachment storage, and the
    /// remote store when storage_backend = "filesystem")
    pub storage_path: String,

    /// Base URL under which locally stored attachments are served
    pub local_files_base_url: String,

    /// S3 bucket for repair-request attachments (when storage_backend = "s3")
    pub repair_attachments_bucket: Option<String>,

    /// S3 bucket for purchase-order attachments (when storage_backend = "s3")
    pub purchase_attachments_bucket: Option<String>,

    /// S3 region
    pub s3_region: Option<String>,

    /// S3 endpoint URL (for MinIO or other S3-compatible services)
    pub s3_endpoint: Option<String>,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT token expiration in seconds
    pub jwt_expiration_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Config("DATABASE_URL not set".into()))?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            storage_backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "filesystem".into()),
            storage_path: env::var("STORAGE_PATH")
                .unwrap_or_else(|_| "/var/lib/isf-playground/files".into()),
            local_files_base_url: env::var("LOCAL_FILES_BASE_URL")
                .unwrap_or_else(|_| "/files".into()),
            repair_attachments_bucket: env::var("REPAIR_ATTACHMENTS_BUCKET").ok(),
            purchase_attachments_bucket: env::var("PURCHASE_ATTACHMENTS_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::Config("JWT_SECRET not set".into()))?,
            jwt_expiration_secs: env::var("JWT_EXPIRATION_SECS")
                .unwrap_or_else(|_| "86400".into())
                .parse()
                .unwrap_or(86400),
        })
    }
}
