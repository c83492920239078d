//! S3 storage backend using the rust-s3 crate.
//!
//! Supports AWS S3 and S3-compatible services (MinIO, etc.). Each backend
//! instance targets a single bucket; the application creates one per
//! attachment kind (repairs, purchases).
//!
//! Credentials are resolved through the default AWS chain:
//! env vars -> ~/.aws/credentials -> container credentials -> instance metadata.

use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;

use super::StorageBackend;
use crate::error::{AppError, Result};

/// S3 storage backend configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint URL (for MinIO compatibility)
    pub endpoint: Option<String>,
}

/// S3 storage backend
pub struct S3Storage {
    bucket: Box<Bucket>,
    /// Base URL used to build the public object URL stored on records
    public_base_url: String,
}

impl S3Storage {
    /// Create a new S3 backend from configuration
    pub fn new(config: S3Config) -> Result<Self> {
        let credentials = Credentials::default()
            .map_err(|e| AppError::Config(format!("Failed to load AWS credentials: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid S3 region: {}", config.region)))?,
        };

        let use_path_style = config.endpoint.is_some();

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Config(format!("Failed to create S3 bucket: {}", e)))?;
        let bucket = if use_path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        // Path-style URL for custom endpoints, virtual-hosted style for AWS.
        let public_base_url = match &config.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                config.bucket, config.region
            ),
        };

        Ok(Self {
            bucket,
            public_base_url,
        })
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<()> {
        self.bucket
            .put_object_with_content_type(key, &content, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to put object '{}': {}", key, e)))?;

        tracing::debug!(key = %key, "S3 put object successful");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to get object '{}': {}", key, e)))?;
        Ok(response.into_bytes())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self.bucket.head_object(key).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("404") || msg.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to check object '{}': {}",
                        key, msg
                    )))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete object '{}': {}", key, e)))?;

        tracing::debug!(key = %key, "S3 delete object successful");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
