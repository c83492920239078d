//! Authentication endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::api::SharedState;
use crate::error::Result;
use crate::services::auth_service::LoginResult;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>> {
    let result = state.auth.login(&request.email, &request.password).await?;
    tracing::info!(email = %request.email, "User logged in");
    Ok(Json(ApiResponse::ok(result)))
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/login", post(login))
}
