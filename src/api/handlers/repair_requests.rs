//! Repair request endpoints.
//!
//! Create and update accept `multipart/form-data` so attachments ride along
//! with the scalar fields. List and detail are plain JSON.

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
use crate::models::repair_request::RepairRequest;
use crate::models::status::{RecordStatus, Urgency};
use crate::services::attachment_service::resolve_uploaders;
use crate::services::repair_service::{CreateRepairRequest, UpdateRepairRequest};
use crate::services::ListPage;

use super::upload::{is_offline_request, parse_multipart};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRepairsQuery {
    /// 1-indexed page number (default 1)
    pub page: Option<u32>,
    /// Page size (default 10, max 100)
    pub limit: Option<u32>,
    /// Sort column (whitelisted; default `created_at`)
    pub sort: Option<String>,
    /// `asc` or `desc` (default `desc`)
    pub order: Option<String>,
    /// Filter by urgency
    pub urgency: Option<Urgency>,
}

/// Repair request with uploader names resolved on its attachments.
#[derive(Debug, Serialize, ToSchema)]
pub struct RepairRequestDetail {
    pub id: Uuid,
    pub issue_name: String,
    pub description: Option<String>,
    pub date_reported: DateTime<Utc>,
    pub urgency: Urgency,
    pub status: RecordStatus,
    pub estimated_cost: f64,
    pub repair_details: Option<String>,
    pub attachments: Vec<AttachmentView>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub created_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairRequestDetail {
    fn new(record: RepairRequest, attachments: Vec<AttachmentView>) -> Self {
        Self {
            id: record.id,
            issue_name: record.issue_name,
            description: record.description,
            date_reported: record.date_reported,
            urgency: record.urgency,
            status: record.status,
            estimated_cost: record.estimated_cost,
            repair_details: record.repair_details,
            attachments,
            completed_at: record.completed_at,
            created_by: record.created_by,
            created_by_name: record.created_by_name,
            created_by_email: record.created_by_email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Create a repair request with optional attachments.
#[utoipa::path(
    post,
    path = "/api/v1/purchase-repair/repair-requests",
    tag = "repair-requests",
    responses(
        (status = 200, description = "Created repair request", body = RepairRequest),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_repair_request(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ApiResponse<RepairRequest>>> {
    let form = parse_multipart(multipart).await?;

    let input = CreateRepairRequest {
        issue_name: form.text("issue_name").unwrap_or_default().to_string(),
        description: form.text_owned("description"),
        date_reported: form.parse_datetime("date_reported")?,
        urgency: form.parse_enum("urgency")?,
        status: form.parse_enum("status")?,
        estimated_cost: form.parse_f64("estimated_cost")?,
        repair_details: form.text_owned("repair_details"),
    };

    let record = state
        .repairs
        .create(input, form.files, auth.user_id, is_offline_request(&headers))
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// Page through repair requests, optionally filtered by urgency.
#[utoipa::path(
    get,
    path = "/api/v1/purchase-repair/repair-requests",
    tag = "repair-requests",
    params(ListRepairsQuery),
    responses(
        (status = 200, description = "Page of repair requests", body = Vec<RepairRequest>),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_repair_requests(
    State(state): State<SharedState>,
    Query(query): Query<ListRepairsQuery>,
) -> Result<Json<ApiResponse<Vec<RepairRequest>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let list_page = ListPage {
        limit: limit as i64,
        offset: (page as i64 - 1) * limit as i64,
        sort: query.sort.unwrap_or_else(|| "created_at".to_string()),
        descending: !matches!(query.order.as_deref(), Some("asc")),
    };

    let records = state.repairs.list(query.urgency, &list_page).await?;
    let total = state.repairs.count(query.urgency).await?;

    Ok(Json(ApiResponse::paginated(
        records,
        Pagination::new(page, limit, total),
    )))
}

/// Fetch one repair request with resolved attachment uploaders.
#[utoipa::path(
    get,
    path = "/api/v1/purchase-repair/repair-requests/{id}",
    tag = "repair-requests",
    params(("id" = Uuid, Path, description = "Repair request id")),
    responses(
        (status = 200, description = "The repair request", body = RepairRequestDetail),
        (status = 404, description = "Repair request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_repair_request(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RepairRequestDetail>>> {
    let record = state
        .repairs
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Repair request not found".to_string()))?;

    let attachments = resolve_uploaders(&state.db, &record.attachments).await?;
    Ok(Json(ApiResponse::ok(RepairRequestDetail::new(
        record,
        attachments,
    ))))
}

/// Update a repair request; newly uploaded files are appended to its
/// attachments.
#[utoipa::path(
    put,
    path = "/api/v1/purchase-repair/repair-requests/{id}",
    tag = "repair-requests",
    params(("id" = Uuid, Path, description = "Repair request id")),
    responses(
        (status = 200, description = "Updated repair request", body = RepairRequest),
        (status = 404, description = "Repair request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_repair_request(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ApiResponse<RepairRequest>>> {
    let form = parse_multipart(multipart).await?;

    let patch = UpdateRepairRequest {
        issue_name: form.text_owned("issue_name"),
        description: form.text_owned("description"),
        date_reported: form.parse_datetime("date_reported")?,
        urgency: form.parse_enum("urgency")?,
        status: form.parse_enum("status")?,
        estimated_cost: form.parse_f64("estimated_cost")?,
        repair_details: form.text_owned("repair_details"),
        attachments: form.parse_json("attachments")?,
    };

    let record = state
        .repairs
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

/// Delete a repair request.
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-repair/repair-requests/{id}",
    tag = "repair-requests",
    params(("id" = Uuid, Path, description = "Repair request id")),
    responses(
        (status = 200, description = "Repair request deleted"),
        (status = 404, description = "Repair request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_repair_request(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.repairs.delete(id).await?;
    Ok(Json(ApiResponse::message("Repair request deleted")))
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_repair_requests).post(create_repair_request))
        .route(
            "/:id",
            get(get_repair_request)
                .put(update_repair_request)
                .delete(delete_repair_request),
        )
}
