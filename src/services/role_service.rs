//! Role store and permission checks.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::role::{merge_permissions, Action, PermissionEntry, Role};

const ROLE_COLUMNS: &str = "id, name, permissions, created_at, updated_at";

/// Role persistence and permission evaluation.
pub struct RoleService {
    db: PgPool,
}

impl RoleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new role. Fails with `Conflict` if a role with the same
    /// trimmed name already exists; the existing role is left untouched.
    pub async fn create_role(
        &self,
        name: &str,
        permissions: Vec<PermissionEntry>,
    ) -> Result<Role> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Role name is required".to_string()));
        }
        validate_entries(&permissions)?;

        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Role '{}' already exists",
                name
            )));
        }

        // Normalize through the merge so duplicate modules in the input
        // collapse to one entry, keeping the per-module invariant from day one.
        let mut merged = Vec::new();
        merge_permissions(&mut merged, permissions);

        let role = sqlx::query_as::<_, Role>(&format!(
            "INSERT INTO roles (name, permissions) VALUES ($1, $2) RETURNING {}",
            ROLE_COLUMNS
        ))
        .bind(name)
        .bind(Json(merged))
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_insert_error(e, name))?;

        tracing::info!(role = %role.name, "Role created");
        Ok(role)
    }

    /// Merge permission patches into a role: per module, replace the action
    /// set if an entry exists, otherwise append a new entry.
    pub async fn update_permissions(
        &self,
        role_id: Uuid,
        patches: Vec<PermissionEntry>,
    ) -> Result<Role> {
        validate_entries(&patches)?;

        let role = self.get_role(role_id).await?;
        let mut permissions = role.permissions.0;
        merge_permissions(&mut permissions, patches);

        let updated = sqlx::query_as::<_, Role>(&format!(
            "UPDATE roles SET permissions = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ROLE_COLUMNS
        ))
        .bind(role_id)
        .bind(Json(permissions))
        .fetch_one(&self.db)
        .await?;

        Ok(updated)
    }

    /// List all roles.
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles ORDER BY name",
            ROLE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(roles)
    }

    /// Fetch one role by id.
    pub async fn get_role(&self, role_id: Uuid) -> Result<Role> {
        sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE id = $1",
            ROLE_COLUMNS
        ))
        .bind(role_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))
    }

    /// Delete a role permanently.
    pub async fn delete_role(&self, role_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Role not found".to_string()));
        }
        Ok(())
    }

    /// True iff the named role exists and grants `action` on `module`.
    /// An unknown role evaluates to false rather than an error; the guard
    /// reports both cases as the same access denial.
    pub async fn check_permission(
        &self,
        role_name: &str,
        module: &str,
        action: Action,
    ) -> Result<bool> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE name = $1",
            ROLE_COLUMNS
        ))
        .bind(role_name)
        .fetch_optional(&self.db)
        .await?;

        Ok(role.map(|r| r.allows(module, action)).unwrap_or(false))
    }
}

/// The pre-insert duplicate check races with concurrent creates; when the
/// `roles.name` unique constraint fires anyway, report it as the same
/// conflict instead of a generic database error.
fn map_insert_error(e: sqlx::Error, name: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Role '{}' already exists", name))
        }
        _ => e.into(),
    }
}

/// Reject permission entries without a usable module name.
fn validate_entries(entries: &[PermissionEntry]) -> Result<()> {
    for entry in entries {
        if entry.module.trim().is_empty() {
            return Err(AppError::Validation(
                "Each permission entry requires a module".to_string(),
            ));
        }
    }
    Ok(())
}
