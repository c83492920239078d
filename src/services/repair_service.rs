//! Repair request store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::attachment::Attachment;
use crate::models::repair_request::RepairRequest;
use crate::models::status::{RecordStatus, Urgency};

use super::attachment_service::{AttachmentKind, AttachmentService, PendingFile};
use super::ListPage;

const SELECT_REPAIR: &str = r#"
    SELECT r.id, r.issue_name, r.description, r.date_reported, r.urgency,
           r.status, r.estimated_cost, r.repair_details, r.attachments,
           r.completed_at, r.created_by,
           u.name AS created_by_name, u.email AS created_by_email,
           r.created_at, r.updated_at
    FROM repair_requests r
    LEFT JOIN users u ON u.id = r.created_by
"#;

/// Input for creating a repair request.
#[derive(Debug, Default)]
pub struct CreateRepairRequest {
    pub issue_name: String,
    pub description: Option<String>,
    pub date_reported: Option<DateTime<Utc>>,
    pub urgency: Option<Urgency>,
    pub status: Option<RecordStatus>,
    pub estimated_cost: Option<f64>,
    pub repair_details: Option<String>,
}

/// Patch for updating a repair request. `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateRepairRequest {
    pub issue_name: Option<String>,
    pub description: Option<String>,
    pub date_reported: Option<DateTime<Utc>>,
    pub urgency: Option<Urgency>,
    pub status: Option<RecordStatus>,
    pub estimated_cost: Option<f64>,
    pub repair_details: Option<String>,
    /// Full replacement for the attachment list. When absent, newly uploaded
    /// files are appended to the existing list.
    pub attachments: Option<Vec<Attachment>>,
}

const REPAIR_SORT_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "date_reported",
    "urgency",
    "status",
    "estimated_cost",
];

/// Repair request persistence and attachment shaping.
pub struct RepairService {
    db: PgPool,
    attachments: Arc<AttachmentService>,
}

impl RepairService {
    pub fn new(db: PgPool, attachments: Arc<AttachmentService>) -> Self {
        Self { db, attachments }
    }

    /// Create a repair request, resolving every pending file first. The
    /// record is not persisted if any upload fails.
    pub async fn create(
        &self,
        input: CreateRepairRequest,
        files: Vec<PendingFile>,
        actor: Uuid,
        is_local: bool,
    ) -> Result<RepairRequest> {
        if input.issue_name.trim().is_empty() {
            return Err(AppError::Validation("issue_name is required".to_string()));
        }

        let attachments = self
            .attachments
            .store_all(AttachmentKind::Repair, files, actor, is_local)
            .await?;

        let status = input.status.unwrap_or_default();
        let completed_at = (status == RecordStatus::Completed).then(Utc::now);

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO repair_requests
                (issue_name, description, date_reported, urgency, status,
                 estimated_cost, repair_details, attachments, completed_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(input.issue_name.trim())
        .bind(&input.description)
        .bind(input.date_reported.unwrap_or_else(Utc::now))
        .bind(input.urgency.unwrap_or_default())
        .bind(status)
        .bind(input.estimated_cost.unwrap_or(0.0))
        .bind(&input.repair_details)
        .bind(Json(attachments))
        .bind(completed_at)
        .bind(actor)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(id = %id, "Repair request created");
        self.fetch_required(id).await
    }

    /// Page of repair requests matching the optional urgency filter.
    pub async fn list(
        &self,
        urgency: Option<Urgency>,
        page: &ListPage,
    ) -> Result<Vec<RepairRequest>> {
        let query = format!(
            "{} WHERE ($1::urgency_level IS NULL OR r.urgency = $1) {} LIMIT $2 OFFSET $3",
            SELECT_REPAIR,
            page.order_clause(REPAIR_SORT_COLUMNS)
        );

        let records = sqlx::query_as::<_, RepairRequest>(&query)
            .bind(urgency)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.db)
            .await?;
        Ok(records)
    }

    /// Count repair requests matching the optional urgency filter.
    pub async fn count(&self, urgency: Option<Urgency>) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM repair_requests WHERE ($1::urgency_level IS NULL OR urgency = $1)",
        )
        .bind(urgency)
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }

    /// Fetch one repair request, or `None` when the id is unknown.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<RepairRequest>> {
        let record = sqlx::query_as::<_, RepairRequest>(&format!(
            "{} WHERE r.id = $1",
            SELECT_REPAIR
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    /// Merge a patch into an existing record. New files are uploaded first
    /// and appended to the attachment list (or to the caller's replacement
    /// list when one is supplied).
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateRepairRequest,
        files: Vec<PendingFile>,
        actor: Uuid,
        is_local: bool,
    ) -> Result<RepairRequest> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Repair request not found".to_string()))?;

        let new_attachments = self
            .attachments
            .store_all(AttachmentKind::Repair, files, actor, is_local)
            .await?;

        let mut attachments = patch.attachments.unwrap_or(existing.attachments.0);
        attachments.extend(new_attachments);

        let status = patch.status.unwrap_or(existing.status);
        // completed_at records the first transition into Completed; leaving
        // Completed clears it again.
        let completed_at = match status {
            RecordStatus::Completed => existing.completed_at.or_else(|| Some(Utc::now())),
            _ => None,
        };

        sqlx::query(
            r#"
            UPDATE repair_requests
            SET issue_name = $2, description = $3, date_reported = $4, urgency = $5,
                status = $6, estimated_cost = $7, repair_details = $8,
                attachments = $9, completed_at = $10, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.issue_name.as_deref().unwrap_or(&existing.issue_name))
        .bind(patch.description.or(existing.description))
        .bind(patch.date_reported.unwrap_or(existing.date_reported))
        .bind(patch.urgency.unwrap_or(existing.urgency))
        .bind(status)
        .bind(patch.estimated_cost.unwrap_or(existing.estimated_cost))
        .bind(patch.repair_details.or(existing.repair_details))
        .bind(Json(attachments))
        .bind(completed_at)
        .execute(&self.db)
        .await?;

        self.fetch_required(id).await
    }

    /// Delete a repair request permanently.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM repair_requests WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Repair request not found".to_string()));
        }
        Ok(())
    }

    async fn fetch_required(&self, id: Uuid) -> Result<RepairRequest> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal("Record vanished after write".to_string()))
    }
}
