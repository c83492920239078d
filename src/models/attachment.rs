//! Embedded attachment metadata.
//!
//! Attachments are stored as a JSONB array on the owning record, never as a
//! standalone table. The storage destination (remote object store vs. local
//! path) is decided once at upload time and the resulting URL is immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Attachment metadata embedded in a record's `attachments` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub file_name: String,
    /// Public URL or locally servable path, fixed at upload time
    pub file_url: String,
    /// MIME type
    pub file_type: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

/// Attachment with the uploader resolved to a display name, used in detail
/// responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttachmentView {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_by: Uuid,
    pub uploaded_by_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl AttachmentView {
    pub fn new(attachment: Attachment, uploaded_by_name: Option<String>) -> Self {
        Self {
            file_name: attachment.file_name,
            file_url: attachment.file_url,
            file_type: attachment.file_type,
            uploaded_by: attachment.uploaded_by,
            uploaded_by_name,
            uploaded_at: attachment.uploaded_at,
        }
    }
}
