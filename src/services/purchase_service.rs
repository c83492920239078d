//! Purchase order store.

use std::sync::Arc;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::attachment::Attachment;
use crate::models::purchase_order::PurchaseOrder;
use crate::models::status::RecordStatus;

use super::attachment_service::{AttachmentKind, AttachmentService, PendingFile};
use super::ListPage;

const SELECT_PURCHASE: &str = r#"
    SELECT r.id, r.machine_details, r.vendor_details, r.cost_estimate,
           r.required_parts, r.status, r.attachments, r.created_by,
           u.name AS created_by_name, u.email AS created_by_email,
           r.created_at, r.updated_at
    FROM purchase_orders r
    LEFT JOIN users u ON u.id = r.created_by
"#;

const PURCHASE_SORT_COLUMNS: &[&str] = &["created_at", "updated_at", "status", "cost_estimate"];

/// Input for creating a purchase order.
#[derive(Debug, Default)]
pub struct CreatePurchaseOrder {
    pub machine_details: String,
    pub vendor_details: String,
    pub cost_estimate: Option<f64>,
    pub required_parts: Option<String>,
    pub status: Option<RecordStatus>,
}

/// Patch for updating a purchase order. `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdatePurchaseOrder {
    pub machine_details: Option<String>,
    pub vendor_details: Option<String>,
    pub cost_estimate: Option<f64>,
    pub required_parts: Option<String>,
    pub status: Option<RecordStatus>,
    /// Full replacement for the attachment list. When absent, newly uploaded
    /// files are appended to the existing list.
    pub attachments: Option<Vec<Attachment>>,
}

/// Purchase order persistence and attachment shaping.
pub struct PurchaseService {
    db: PgPool,
    attachments: Arc<AttachmentService>,
}

impl PurchaseService {
    pub fn new(db: PgPool, attachments: Arc<AttachmentService>) -> Self {
        Self { db, attachments }
    }

    /// Create a purchase order, resolving every pending file first. The
    /// record is not persisted if any upload fails.
    pub async fn create(
        &self,
        input: CreatePurchaseOrder,
        files: Vec<PendingFile>,
        actor: Uuid,
        is_local: bool,
    ) -> Result<PurchaseOrder> {
        if input.machine_details.trim().is_empty() {
            return Err(AppError::Validation(
                "machine_details is required".to_string(),
            ));
        }
        if input.vendor_details.trim().is_empty() {
            return Err(AppError::Validation(
                "vendor_details is required".to_string(),
            ));
        }

        let attachments = self
            .attachments
            .store_all(AttachmentKind::Purchase, files, actor, is_local)
            .await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO purchase_orders
                (machine_details, vendor_details, cost_estimate, required_parts,
                 status, attachments, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.machine_details.trim())
        .bind(input.vendor_details.trim())
        .bind(input.cost_estimate.unwrap_or(0.0))
        .bind(&input.required_parts)
        .bind(input.status.unwrap_or_default())
        .bind(Json(attachments))
        .bind(actor)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(id = %id, "Purchase order created");
        self.fetch_required(id).await
    }

    /// Page of purchase orders matching the optional status filter.
    pub async fn list(
        &self,
        status: Option<RecordStatus>,
        page: &ListPage,
    ) -> Result<Vec<PurchaseOrder>> {
        let query = format!(
            "{} WHERE ($1::record_status IS NULL OR r.status = $1) {} LIMIT $2 OFFSET $3",
            SELECT_PURCHASE,
            page.order_clause(PURCHASE_SORT_COLUMNS)
        );

        let records = sqlx::query_as::<_, PurchaseOrder>(&query)
            .bind(status)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.db)
            .await?;
        Ok(records)
    }

    /// Count purchase orders matching the optional status filter.
    pub async fn count(&self, status: Option<RecordStatus>) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM purchase_orders WHERE ($1::record_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }

    /// Fetch one purchase order, or `None` when the id is unknown.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        let record = sqlx::query_as::<_, PurchaseOrder>(&format!(
            "{} WHERE r.id = $1",
            SELECT_PURCHASE
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
        patch: UpdatePurchaseOrder,
        files: Vec<PendingFile>,
        actor: Uuid,
        is_local: bool,
    ) -> Result<PurchaseOrder> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase order not found".to_string()))?;

        let new_attachments = self
            .attachments
            .store_all(AttachmentKind::Purchase, files, actor, is_local)
            .await?;

        let mut attachments = patch.attachments.unwrap_or(existing.attachments.0);
        attachments.extend(new_attachments);

        sqlx::query(
            r#"
            UPDATE purchase_orders
            SET machine_details = $2, vendor_details = $3, cost_estimate = $4,
                required_parts = $5, status = $6, attachments = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(
            patch
                .machine_details
                .as_deref()
                .unwrap_or(&existing.machine_details),
        )
        .bind(
            patch
                .vendor_details
                .as_deref()
                .unwrap_or(&existing.vendor_details),
        )
        .bind(patch.cost_estimate.unwrap_or(existing.cost_estimate))
        .bind(patch.required_parts.or(existing.required_parts))
        .bind(patch.status.unwrap_or(existing.status))
        .bind(Json(attachments))
        .execute(&self.db)
        .await?;

        self.fetch_required(id).await
    }

    /// Delete a purchase order permanently.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Purchase order not found".to_string()));
        }
        Ok(())
    }

    async fn fetch_required(&self, id: Uuid) -> Result<PurchaseOrder> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal("Record vanished after write".to_string()))
    }
}
