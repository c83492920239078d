//! Bearer token authentication middleware.
//!
//! Validates the `Authorization: Bearer <token>` header and stashes the
//! caller's identity in the request extensions for downstream handlers and
//! the permission guard.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth_service::AuthService;

const MAC_ADDRESS_HEADER: &str = "x-mac-address";

/// Authenticated caller identity, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthExtension {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Device identifier reported by offline-capable clients.
    pub mac_address: Option<String>,
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Reject requests without a valid bearer token.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return AppError::Authentication("Missing authorization token".to_string())
            .into_response();
    };

    let claims = match auth.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Token validation failed");
            return AppError::Authentication("Invalid or expired token".to_string())
                .into_response();
        }
    };

    let mac_address = request
        .headers()
        .get(MAC_ADDRESS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    request.extensions_mut().insert(AuthExtension {
        user_id: claims.sub,
        name: claims.name,
        email: claims.email,
        role: claims.role,
        mac_address,
    });

    next.run(request).await
}
