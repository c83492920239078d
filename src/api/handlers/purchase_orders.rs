//! Purchase order endpoints.
//!
//! Same surface shape as the repair request handlers: multipart writes,
//! JSON reads, status filter instead of urgency.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::dto::{ApiResponse, Pagination};
use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::attachment::AttachmentView;
use crate::models::purchase_order::PurchaseOrder;
use crate::models::status::RecordStatus;
use crate::services::attachment_service::resolve_uploaders;
use crate::services::purchase_service::{CreatePurchaseOrder, UpdatePurchaseOrder};
use crate::services::ListPage;

use super::upload::{is_offline_request, parse_multipart};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPurchasesQuery {
    /// 1-indexed page number (default 1)
    pub page: Option<u32>,
    /// Page size (default 10, max 100)
    pub limit: Option<u32>,
    /// Sort column (whitelisted; default `created_at`)
    pub sort: Option<String>,
    /// `asc` or `desc` (default `desc`)
    pub order: Option<String>,
    /// Filter by status
    pub status: Option<RecordStatus>,
}

/// Purchase order with uploader names resolved on its attachments.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseOrderDetail {
    pub id: Uuid,
    pub machine_details: String,
    pub vendor_details: String,
    pub cost_estimate: f64,
    pub required_parts: Option<String>,
    pub status: RecordStatus,
    pub attachments: Vec<AttachmentView>,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub created_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrderDetail {
    fn new(record: PurchaseOrder, attachments: Vec<AttachmentView>) -> Self {
        Self {
            id: record.id,
            machine_details: record.machine_details,
            vendor_details: record.vendor_details,
            cost_estimate: record.cost_estimate,
            required_parts: record.required_parts,
            status: record.status,
            attachments,
            created_by: record.created_by,
            created_by_name: record.created_by_name,
            created_by_email: record.created_by_email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Create a purchase order with optional attachments.
#[utoipa::path(
    post,
    path = "/api/v1/purchase-repair/purchase-orders",
    tag = "purchase-orders",
    responses(
        (status = 200, description = "Created purchase order", body = PurchaseOrder),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_purchase_order(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PurchaseOrder>>> {
    let form = parse_multipart(multipart).await?;

    let input = CreatePurchaseOrder {
        machine_details: form.text("machine_details").unwrap_or_default().to_string(),
        vendor_details: form.text("vendor_details").unwrap_or_default().to_string(),
        cost_estimate: form.parse_f64("cost_estimate")?,
        required_parts: form.text_owned("required_parts"),
        status: form.parse_enum("status")?,
    };

    let record = state
        .purchases
        .create(input, form.files, auth.user_id, is_offline_request(&headers))
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// Page through purchase orders, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/v1/purchase-repair/purchase-orders",
    tag = "purchase-orders",
    params(ListPurchasesQuery),
    responses(
        (status = 200, description = "Page of purchase orders", body = Vec<PurchaseOrder>),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_purchase_orders(
    State(state): State<SharedState>,
    Query(query): Query<ListPurchasesQuery>,
) -> Result<Json<ApiResponse<Vec<PurchaseOrder>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let list_page = ListPage {
        limit: limit as i64,
        offset: (page as i64 - 1) * limit as i64,
        sort: query.sort.unwrap_or_else(|| "created_at".to_string()),
        descending: !matches!(query.order.as_deref(), Some("asc")),
    };

    let records = state.purchases.list(query.status, &list_page).await?;
    let total = state.purchases.count(query.status).await?;

    Ok(Json(ApiResponse::paginated(
        records,
        Pagination::new(page, limit, total),
    )))
}

/// Fetch one purchase order with resolved attachment uploaders.
#[utoipa::path(
    get,
    path = "/api/v1/purchase-repair/purchase-orders/{id}",
    tag = "purchase-orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "The purchase order", body = PurchaseOrderDetail),
        (status = 404, description = "Purchase order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_purchase_order(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PurchaseOrderDetail>>> {
    let record = state
        .purchases
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order not found".to_string()))?;

    let attachments = resolve_uploaders(&state.db, &record.attachments).await?;
    Ok(Json(ApiResponse::ok(PurchaseOrderDetail::new(
        record,
        attachments,
    ))))
}

/// Update a purchase order; newly uploaded files are appended to its
/// attachments.
#[utoipa::path(
    put,
    path = "/api/v1/purchase-repair/purchase-orders/{id}",
    tag = "purchase-orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Updated purchase order", body = PurchaseOrder),
        (status = 404, description = "Purchase order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_purchase_order(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PurchaseOrder>>> {
    let form = parse_multipart(multipart).await?;

    let patch = UpdatePurchaseOrder {
        machine_details: form.text_owned("machine_details"),
        vendor_details: form.text_owned("vendor_details"),
        cost_estimate: form.parse_f64("cost_estimate")?,
        required_parts: form.text_owned("required_parts"),
        status: form.parse_enum("status")?,
        attachments: form.parse_json("attachments")?,
    };

    let record = state
        .purchases
        .update(
            id,
            patch,
            form.files,
            auth.user_id,
            is_offline_request(&headers),
        )
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// Delete a purchase order.
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-repair/purchase-orders/{id}",
    tag = "purchase-orders",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order deleted"),
        (status = 404, description = "Purchase order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_purchase_order(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.purchases.delete(id).await?;
    Ok(Json(ApiResponse::message("Purchase order deleted")))
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route(
            "/:id",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
}
