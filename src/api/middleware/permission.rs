//! Module permission guard.
//!
//! Runs after [`super::auth::auth_middleware`] and checks that the caller's
//! role grants the action implied by the HTTP method on the guarded module.
//! An unknown role and a missing grant produce the same denial, so callers
//! cannot probe which roles exist.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::models::role::Action;
use crate::services::role_service::RoleService;

use super::auth::AuthExtension;

/// Module gating all repair request, purchase order and overview routes.
pub const PURCHASE_REPAIR_MODULE: &str = "Purchase and Repair";
/// Module gating the role administration routes.
pub const ROLE_MANAGEMENT_MODULE: &str = "Role Management";

/// Per-route-group state for the permission guard.
#[derive(Clone)]
pub struct PermissionState {
    pub roles: Arc<RoleService>,
    pub module: &'static str,
}

fn denied() -> Response {
    AppError::Authorization("Access denied".to_string()).into_response()
}

/// Reject requests whose role does not grant the implied action.
pub async fn permission_middleware(
    State(state): State<PermissionState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(auth) = request.extensions().get::<AuthExtension>().cloned() else {
        // The auth middleware did not run; treat as unauthenticated.
        return AppError::Authentication("Missing authorization token".to_string())
            .into_response();
    };

    let Some(action) = Action::from_method(request.method()) else {
        return denied();
    };

    match state
        .roles
        .check_permission(&auth.role, state.module, action)
        .await
    {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            tracing::warn!(
                role = %auth.role,
                module = state.module,
                action = ?action,
                "Permission denied"
            );
            denied()
        }
        Err(e) => e.into_response(),
    }
}
