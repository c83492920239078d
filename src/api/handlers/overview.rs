//! Dashboard overview endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::api::SharedState;
use crate::error::Result;
use crate::services::overview_service::Overview;

/// Dashboard snapshot across both record stores.
#[utoipa::path(
    get,
    path = "/api/v1/purchase-repair/overview",
    tag = "overview",
    responses(
        (status = 200, description = "Dashboard overview", body = Overview),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_overview(State(state): State<SharedState>) -> Result<Json<ApiResponse<Overview>>> {
    let overview = state.overview.get_overview().await?;
    Ok(Json(ApiResponse::ok(overview)))
}
