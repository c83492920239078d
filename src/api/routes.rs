//! Route definitions for the API.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware, Router};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers;
use super::middleware::auth::auth_middleware;
use super::middleware::permission::{
    permission_middleware, PermissionState, PURCHASE_REPAIR_MODULE, ROLE_MANAGEMENT_MODULE,
};
use super::SharedState;

/// Multipart bodies carry attachments; allow up to 32 MB per request.
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Create the main API router.
pub fn create_router(state: SharedState) -> Router {
    let openapi = super::openapi::build_openapi();

    // Record routes and the overview share one guarded module; every request
    // passes bearer auth first, then the permission check for the action
    // implied by its HTTP method.
    let purchase_repair = Router::new()
        .nest("/repair-requests", handlers::repair_requests::router())
        .nest("/purchase-orders", handlers::purchase_orders::router())
        .route("/overview", get(handlers::overview::get_overview))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(middleware::from_fn_with_state(
            PermissionState {
                roles: state.roles.clone(),
                module: PURCHASE_REPAIR_MODULE,
            },
            permission_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let roles = handlers::roles::router()
        .layer(middleware::from_fn_with_state(
            PermissionState {
                roles: state.roles.clone(),
                module: ROLE_MANAGEMENT_MODULE,
            },
            permission_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // OpenAPI spec and Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api/v1/openapi.json", openapi))
        .nest("/api/v1/auth", handlers::auth::router())
        .nest("/api/v1/purchase-repair", purchase_repair)
        .nest("/api/roles", roles)
        .with_state(state)
}
