//! Storage backends for attachment files.

pub mod filesystem;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Storage backend trait.
///
/// Keys may contain `/` separators (e.g. `repairs/<uuid>.pdf`); backends are
/// responsible for mapping them to their own layout.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store content under the given key
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<()>;

    /// Retrieve content by key
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Check if key exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete content by key
    async fn delete(&self, key: &str) -> Result<()>;

    /// Public URL (or servable path) under which the stored object can be
    /// fetched. Recorded once on the owning record at upload time.
    fn public_url(&self, key: &str) -> String;
}
