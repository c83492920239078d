//! Role administration endpoints.
//!
//! All routes here sit behind the auth middleware and the permission guard
//! for the "Role Management" module.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::dto::ApiResponse;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::role::{PermissionEntry, Role};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<PermissionEntry>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePermissionsRequest {
    pub permissions: Vec<PermissionEntry>,
}

/// List all roles.
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "roles",
    responses(
        (status = 200, description = "All roles", body = Vec<Role>),
        (status = 403, description = "Access denied")
    )
)]
pub async fn list_roles(State(state): State<SharedState>) -> Result<Json<ApiResponse<Vec<Role>>>> {
    let roles = state.roles.list_roles().await?;
    Ok(Json(ApiResponse::ok(roles)))
}

/// Create a role with an initial permission list.
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created", body = Role),
        (status = 409, description = "Role name already taken")
    )
)]
pub async fn create_role(
    State(state): State<SharedState>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<Json<ApiResponse<Role>>> {
    let role = state
        .roles
        .create_role(&request.name, request.permissions)
        .await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// Fetch one role.
#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "The role", body = Role),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Role>>> {
    let role = state.roles.get_role(id).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// Merge permission patches into a role.
#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "roles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Updated role", body = Role),
        (status = 404, description = "Role not found")
    )
)]
pub async fn update_permissions(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePermissionsRequest>,
) -> Result<Json<ApiResponse<Role>>> {
    let role = state
        .roles
        .update_permissions(id, request.permissions)
        .await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// Delete a role.
#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role deleted"),
        (status = 404, description = "Role not found")
    )
)]
pub async fn delete_role(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.roles.delete_role(id).await?;
    Ok(Json(ApiResponse::message("Role deleted")))
}

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route(
            "/:id",
            get(get_role).put(update_permissions).delete(delete_role),
        )
}
