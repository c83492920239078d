//! Repair request model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::attachment::Attachment;
use super::status::{RecordStatus, Urgency};

/// Repair request entity.
///
/// `created_by_name` / `created_by_email` are populated by a LEFT JOIN on
/// users in every read path.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct RepairRequest {
    pub id: Uuid,
    pub issue_name: String,
    pub description: Option<String>,
    pub date_reported: DateTime<Utc>,
    pub urgency: Urgency,
    pub status: RecordStatus,
    pub estimated_cost: f64,
    pub repair_details: Option<String>,
    #[schema(value_type = Vec<Attachment>)]
    pub attachments: Json<Vec<Attachment>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub created_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
