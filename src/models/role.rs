//! Role and permission models.
//!
//! A role carries a flat list of per-module grants. Modules are free-text
//! names defined by whatever feature needs gating, so there is no fixed
//! module registry; lookups are a linear scan over a small list.

use axum::http::Method;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Permitted action on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// Map an HTTP method to the action it implies on a guarded module.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::POST => Some(Self::Create),
            Method::GET => Some(Self::Read),
            Method::PUT => Some(Self::Update),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A single module grant within a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PermissionEntry {
    pub module: String,
    pub actions: Vec<Action>,
}

/// Role entity
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = Vec<PermissionEntry>)]
    pub permissions: Json<Vec<PermissionEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// True iff some grant names `module` exactly and contains `action`.
    /// Module comparison is case-sensitive.
    pub fn allows(&self, module: &str, action: Action) -> bool {
        self.permissions
            .iter()
            .any(|entry| entry.module == module && entry.actions.contains(&action))
    }
}

/// Merge permission patches into an existing grant list.
///
/// For each patch, an existing entry for the same module has its actions
/// replaced; otherwise the patch is appended. This keeps the invariant of at
/// most one entry per module and makes the operation idempotent per module.
pub fn merge_permissions(existing: &mut Vec<PermissionEntry>, patches: Vec<PermissionEntry>) {
    for patch in patches {
        match existing.iter_mut().find(|e| e.module == patch.module) {
            Some(entry) => entry.actions = patch.actions,
            None => existing.push(patch),
        }
    }
}
