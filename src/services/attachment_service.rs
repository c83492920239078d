//! Attachment upload resolution.
//!
//! Every attachment in a create/update request is resolved to a final stored
//! location before the owning record is persisted. The destination depends on
//! the caller's offline flag: offline requests go to local disk under a
//! locally servable path, online requests go to the remote object store
//! bucket for the entity kind. Uploads within one request run sequentially;
//! if any upload fails, objects already transferred in the same batch are
//! deleted again (best-effort) and the whole request fails.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::attachment::{Attachment, AttachmentView};
use crate::storage::filesystem::FilesystemStorage;
use crate::storage::s3::{S3Config, S3Storage};
use crate::storage::StorageBackend;

/// Which record type an attachment belongs to. Selects the remote bucket and
/// the key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Repair,
    Purchase,
}

impl AttachmentKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Repair => "repairs",
            Self::Purchase => "purchases",
        }
    }
}

/// An uploaded file awaiting storage resolution.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Resolves pending files to stored attachments.
pub struct AttachmentService {
    remote_repairs: Arc<dyn StorageBackend>,
    remote_purchases: Arc<dyn StorageBackend>,
    local: Arc<dyn StorageBackend>,
}

impl AttachmentService {
    pub fn new(
        remote_repairs: Arc<dyn StorageBackend>,
        remote_purchases: Arc<dyn StorageBackend>,
        local: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            remote_repairs,
            remote_purchases,
            local,
        }
    }

    /// Build the service from configuration. With the "s3" backend, each
    /// entity kind gets its own bucket; with "filesystem", remote uploads
    /// land next to the offline ones.
    pub fn from_config(config: &Config) -> Result<Self> {
        let local: Arc<dyn StorageBackend> = Arc::new(FilesystemStorage::new(
            &config.storage_path,
            &config.local_files_base_url,
        ));

        let (remote_repairs, remote_purchases) = match config.storage_backend.as_str() {
            "s3" => {
                let region = config
                    .s3_region
                    .clone()
                    .ok_or_else(|| AppError::Config("S3_REGION not set".into()))?;
                let repair_bucket = config
                    .repair_attachments_bucket
                    .clone()
                    .ok_or_else(|| AppError::Config("REPAIR_ATTACHMENTS_BUCKET not set".into()))?;
                let purchase_bucket = config.purchase_attachments_bucket.clone().ok_or_else(
                    || AppError::Config("PURCHASE_ATTACHMENTS_BUCKET not set".into()),
                )?;

                let repairs: Arc<dyn StorageBackend> = Arc::new(S3Storage::new(S3Config {
                    bucket: repair_bucket,
                    region: region.clone(),
                    endpoint: config.s3_endpoint.clone(),
                })?);
                let purchases: Arc<dyn StorageBackend> = Arc::new(S3Storage::new(S3Config {
                    bucket: purchase_bucket,
                    region,
                    endpoint: config.s3_endpoint.clone(),
                })?);
                (repairs, purchases)
            }
            "filesystem" => (local.clone(), local.clone()),
            other => {
                return Err(AppError::Config(format!(
                    "Unknown storage backend: {}",
                    other
                )))
            }
        };

        Ok(Self::new(remote_repairs, remote_purchases, local))
    }

    fn remote_for(&self, kind: AttachmentKind) -> &Arc<dyn StorageBackend> {
        match kind {
            AttachmentKind::Repair => &self.remote_repairs,
            AttachmentKind::Purchase => &self.remote_purchases,
        }
    }

    /// Store every pending file and return the resulting attachment metadata.
    ///
    /// All-or-nothing: on the first failed upload, objects stored earlier in
    /// the same batch are deleted again (failures there are only logged) and
    /// the error is returned, so the caller never persists a partial batch.
    pub async fn store_all(
        &self,
        kind: AttachmentKind,
        files: Vec<PendingFile>,
        uploaded_by: Uuid,
        is_local: bool,
    ) -> Result<Vec<Attachment>> {
        let backend = if is_local {
            &self.local
        } else {
            self.remote_for(kind)
        };

        let mut attachments = Vec::with_capacity(files.len());
        let mut stored_keys: Vec<String> = Vec::new();

        for file in files {
            let key = format!("{}/{}", kind.prefix(), generate_file_name(&file.file_name));

            if let Err(e) = backend.put(&key, file.bytes, &file.content_type).await {
                tracing::error!(key = %key, error = %e, "Attachment upload failed, rolling back batch");
                for stored in &stored_keys {
                    if let Err(de) = backend.delete(stored).await {
                        tracing::warn!(key = %stored, error = %de, "Failed to roll back uploaded attachment");
                    }
                }
                return Err(e);
            }

            stored_keys.push(key.clone());
            attachments.push(Attachment {
                file_name: file.file_name,
                file_url: backend.public_url(&key),
                file_type: file.content_type,
                uploaded_by,
                uploaded_at: Utc::now(),
            });
        }

        Ok(attachments)
    }
}

/// Generate a collision-free stored file name, keeping a sanitized extension
/// from the original name.
pub fn generate_file_name(original: &str) -> String {
    let ext = std::path::Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

/// Resolve attachment uploader ids to display names for detail responses.
pub async fn resolve_uploaders(
    db: &PgPool,
    attachments: &[Attachment],
) -> Result<Vec<AttachmentView>> {
    let ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = attachments.iter().map(|a| a.uploaded_by).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    let names: HashMap<Uuid, String> = if ids.is_empty() {
        HashMap::new()
    } else {
        sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(db)
            .await?
            .into_iter()
            .collect()
    };

    Ok(attachments
        .iter()
        .cloned()
        .map(|a| {
            let name = names.get(&a.uploaded_by).cloned();
            AttachmentView::new(a, name)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // -----------------------------------------------------------------------
    // generate_file_name
    // -----------------------------------------------------------------------

    #[test]
    fn test_generate_file_name_keeps_extension() {
        let name = generate_file_name("photo.JPG");
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 36 + 4); // uuid + ".jpg"
    }

    #[test]
    fn test_generate_file_name_without_extension() {
        let name = generate_file_name("README");
        assert_eq!(name.len(), 36);
    }

    #[test]
    fn test_generate_file_name_drops_suspicious_extension() {
        let name = generate_file_name("weird.name.with/slash.e$t");
        assert!(!name.contains('/'));
        assert!(!name.contains('$'));
    }

    #[test]
    fn test_generate_file_name_unique_per_call() {
        assert_ne!(generate_file_name("a.pdf"), generate_file_name("a.pdf"));
    }

    // -----------------------------------------------------------------------
    // store_all
    // -----------------------------------------------------------------------

    fn filesystem_service(dir: &TempDir) -> AttachmentService {
        let backend: Arc<dyn StorageBackend> =
            Arc::new(FilesystemStorage::new(dir.path(), "/files"));
        AttachmentService::new(backend.clone(), backend.clone(), backend)
    }

    fn pending(name: &str, content: &'static [u8]) -> PendingFile {
        PendingFile {
            file_name: name.to_string(),
            content_type: "application/octet-stream".to_string(),
            bytes: Bytes::from_static(content),
        }
    }

    #[tokio::test]
    async fn test_store_all_records_metadata() {
        let dir = TempDir::new().unwrap();
        let service = filesystem_service(&dir);
        let uploader = Uuid::new_v4();

        let attachments = service
            .store_all(
                AttachmentKind::Repair,
                vec![pending("invoice.pdf", b"pdf-bytes")],
                uploader,
                false,
            )
            .await
            .unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].file_name, "invoice.pdf");
        assert_eq!(attachments[0].uploaded_by, uploader);
        assert!(attachments[0].file_url.starts_with("/files/repairs/"));
        assert!(attachments[0].file_url.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_store_all_empty_batch() {
        let dir = TempDir::new().unwrap();
        let service = filesystem_service(&dir);
        let attachments = service
            .store_all(AttachmentKind::Purchase, vec![], Uuid::new_v4(), false)
            .await
            .unwrap();
        assert!(attachments.is_empty());
    }

    #[tokio::test]
    async fn test_store_all_uses_kind_prefix() {
        let dir = TempDir::new().unwrap();
        let service = filesystem_service(&dir);

        let purchases = service
            .store_all(
                AttachmentKind::Purchase,
                vec![pending("quote.pdf", b"q")],
                Uuid::new_v4(),
                false,
            )
            .await
            .unwrap();

        assert!(purchases[0].file_url.contains("/purchases/"));
    }

    /// Backend that fails every put after the first N, recording deletes.
    struct FlakyBackend {
        inner: FilesystemStorage,
        allowed_puts: Mutex<usize>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageBackend for FlakyBackend {
        async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<()> {
            {
                let mut allowed = self.allowed_puts.lock().unwrap();
                if *allowed == 0 {
                    return Err(crate::error::AppError::Storage("simulated outage".into()));
                }
                *allowed -= 1;
            }
            self.inner.put(key, content, content_type).await
        }

        async fn get(&self, key: &str) -> Result<Bytes> {
            self.inner.get(key).await
        }

        async fn exists(&self, key: &str) -> Result<bool> {
            self.inner.exists(key).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            self.inner.delete(key).await
        }

        fn public_url(&self, key: &str) -> String {
            self.inner.public_url(key)
        }
    }

    #[tokio::test]
    async fn test_store_all_rolls_back_earlier_uploads_on_failure() {
        let dir = TempDir::new().unwrap();
        let flaky = Arc::new(FlakyBackend {
            inner: FilesystemStorage::new(dir.path(), "/files"),
            allowed_puts: Mutex::new(1),
            deleted: Mutex::new(Vec::new()),
        });
        let service = AttachmentService::new(
            flaky.clone(),
            flaky.clone(),
            Arc::new(FilesystemStorage::new(dir.path(), "/files")),
        );

        let result = service
            .store_all(
                AttachmentKind::Repair,
                vec![pending("first.txt", b"1"), pending("second.txt", b"2")],
                Uuid::new_v4(),
                false,
            )
            .await;

        assert!(result.is_err());
        let deleted = flaky.deleted.lock().unwrap();
        assert_eq!(deleted.len(), 1, "the successful first upload is rolled back");
        assert!(deleted[0].starts_with("repairs/"));
    }

    #[tokio::test]
    async fn test_store_all_local_flag_bypasses_remote() {
        let remote_dir = TempDir::new().unwrap();
        let local_dir = TempDir::new().unwrap();
        let remote: Arc<dyn StorageBackend> =
            Arc::new(FilesystemStorage::new(remote_dir.path(), "/remote"));
        let local: Arc<dyn StorageBackend> =
            Arc::new(FilesystemStorage::new(local_dir.path(), "/files"));
        let service = AttachmentService::new(remote.clone(), remote, local);

        let attachments = service
            .store_all(
                AttachmentKind::Repair,
                vec![pending("offline.png", b"png")],
                Uuid::new_v4(),
                true,
            )
            .await
            .unwrap();

        assert!(attachments[0].file_url.starts_with("/files/repairs/"));
        assert!(remote_dir.path().join("repairs").read_dir().is_err());
    }
}
