//! Dashboard aggregation.
//!
//! Read-only fan-out over the two record stores. The two source queries are
//! not atomic with each other; the overview is a snapshot, not a ledger.

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc,
};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::models::status::RecordStatus;

/// Number of entries fetched from each store and kept after the merge.
const RECENT_LIMIT: i64 = 10;

/// Source store of a recent-activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Repair,
    Purchase,
}

/// One entry in the recent-activity feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Activity {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub title: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub created_by_name: Option<String>,
}

#[derive(Debug, FromRow)]
struct RecentRow {
    id: Uuid,
    title: String,
    status: RecordStatus,
    created_at: DateTime<Utc>,
    created_by_name: Option<String>,
}

impl RecentRow {
    fn into_activity(self, kind: ActivityKind) -> Activity {
        Activity {
            id: self.id,
            kind,
            title: self.title,
            status: self.status,
            created_at: self.created_at,
            created_by_name: self.created_by_name,
        }
    }
}

/// Dashboard overview payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct Overview {
    pub active_repairs: i64,
    pub pending_orders: i64,
    pub completed_this_week: i64,
    pub budget_used: f64,
    pub recent_activities: Vec<Activity>,
}

/// Aggregation service computing the dashboard overview.
pub struct OverviewService {
    db: PgPool,
}

impl OverviewService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Compute the dashboard snapshot.
    pub async fn get_overview(&self) -> Result<Overview> {
        let active_repairs: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM repair_requests WHERE status IN ('pending', 'in-progress')",
        )
        .fetch_one(&self.db)
        .await?;

        let pending_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchase_orders WHERE status = 'pending'")
                .fetch_one(&self.db)
                .await?;

        let (week_start, week_end) = week_bounds(Local::now());
        let completed_this_week: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM repair_requests
            WHERE status = 'completed'
              AND completed_at >= $1 AND completed_at < $2
            "#,
        )
        .bind(week_start.with_timezone(&Utc))
        .bind(week_end.with_timezone(&Utc))
        .fetch_one(&self.db)
        .await?;

        // Total spend committed to completed work across both stores.
        let budget_used: f64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COALESCE(SUM(estimated_cost), 0)
                      FROM repair_requests WHERE status = 'completed')
                 + (SELECT COALESCE(SUM(cost_estimate), 0)
                      FROM purchase_orders WHERE status = 'completed')
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let repairs = sqlx::query_as::<_, RecentRow>(
            r#"
            SELECT r.id, r.issue_name AS title, r.status, r.created_at,
                   u.name AS created_by_name
            FROM repair_requests r
            LEFT JOIN users u ON u.id = r.created_by
            ORDER BY r.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let purchases = sqlx::query_as::<_, RecentRow>(
            r#"
            SELECT r.id, r.machine_details AS title, r.status, r.created_at,
                   u.name AS created_by_name
            FROM purchase_orders r
            LEFT JOIN users u ON u.id = r.created_by
            ORDER BY r.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.db)
        .await?;

        let recent_activities = merge_recent(
            repairs
                .into_iter()
                .map(|r| r.into_activity(ActivityKind::Repair))
                .collect(),
            purchases
                .into_iter()
                .map(|r| r.into_activity(ActivityKind::Purchase))
                .collect(),
        );

        Ok(Overview {
            active_repairs,
            pending_orders,
            completed_this_week,
            budget_used,
            recent_activities,
        })
    }
}

/// Half-open bounds of the calendar week containing `now`: Sunday 00:00:00
/// up to (but excluding) the following Sunday 00:00:00, in `now`'s timezone.
pub fn week_bounds<Tz: TimeZone>(now: DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    let days_from_sunday = now.weekday().num_days_from_sunday() as i64;
    let start_date = now.date_naive() - Duration::days(days_from_sunday);
    // Both bounds come from their own calendar date: a Sunday whose midnight
    // falls in a DST gap must not shift the other end of the week.
    let start = day_start(&now.timezone(), start_date);
    let end = day_start(&now.timezone(), start_date + Duration::days(7));
    (start, end)
}

/// First valid instant of `date` in `tz`. Normally midnight; when a DST jump
/// removes midnight, the earliest wall-clock minute after the gap. An
/// ambiguous midnight (clocks rolled back) takes the earlier reading.
fn day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    for minutes in 0..24 * 60 {
        let candidate = date.and_time(NaiveTime::MIN) + Duration::minutes(minutes);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earlier, _) => return earlier,
            LocalResult::None => continue,
        }
    }
    // No timezone removes an entire day; pin to UTC midnight rather than loop.
    tz.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Merge the two pre-sorted top-N lists: concatenate, stable-sort descending
/// by creation time, truncate. Ties keep their pre-sort relative order; no
/// correctness property depends on sub-millisecond ordering.
pub fn merge_recent(repairs: Vec<Activity>, purchases: Vec<Activity>) -> Vec<Activity> {
    let mut merged = repairs;
    merged.extend(purchases);
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged.truncate(RECENT_LIMIT as usize);
    merged
}
