//! HTTP API: application state, routing, middleware and handlers.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::error::Result;
use crate::services::attachment_service::AttachmentService;
use crate::services::auth_service::AuthService;
use crate::services::overview_service::OverviewService;
use crate::services::purchase_service::PurchaseService;
use crate::services::repair_service::RepairService;
use crate::services::role_service::RoleService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: PgPool,
    pub auth: Arc<AuthService>,
    pub roles: Arc<RoleService>,
    pub repairs: Arc<RepairService>,
    pub purchases: Arc<PurchaseService>,
    pub overview: Arc<OverviewService>,
}

impl AppState {
    pub fn new(config: Config, db: PgPool) -> Result<Self> {
        let config = Arc::new(config);
        let attachments = Arc::new(AttachmentService::from_config(&config)?);

        Ok(Self {
            auth: Arc::new(AuthService::new(db.clone(), config.clone())),
            roles: Arc::new(RoleService::new(db.clone())),
            repairs: Arc::new(RepairService::new(db.clone(), attachments.clone())),
            purchases: Arc::new(PurchaseService::new(db.clone(), attachments)),
            overview: Arc::new(OverviewService::new(db.clone())),
            config,
            db,
        })
    }
}

/// Shared state type used by handlers.
pub type SharedState = Arc<AppState>;
