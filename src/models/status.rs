//! Shared status and urgency enums for trackable records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status shared by repair requests and purchase orders.
///
/// This is a plain data field, not a guarded state machine: any status may be
/// written regardless of the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "record_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for RecordStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Urgency of a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "urgency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Low
    }
}
