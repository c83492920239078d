//! Purchase order model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::attachment::Attachment;
use super::status::RecordStatus;

/// Purchase order entity.
///
/// Same read-path shape as [`super::repair_request::RepairRequest`]: creator
/// fields come from a LEFT JOIN on users.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub machine_details: String,
    pub vendor_details: String,
    pub cost_estimate: f64,
    pub required_parts: Option<String>,
    pub status: RecordStatus,
    #[schema(value_type = Vec<Attachment>)]
    pub attachments: Json<Vec<Attachment>>,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub created_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
