//! Retention cleanup.
//!
//! Two independent age-based policies. Assessments are special-cased: the
//! most recent assessment for each parcel is always kept, no matter how old.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use stormrisk_common::Result;

/// Retention windows in days, one per policy.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RetentionPolicy {
    /// Inactive events older than this are deleted.
    pub active_event_days: i32,
    /// Non-latest assessments older than this are deleted.
    pub assessment_days: i32,
}

impl Default for RetentionPolicy {
    /// Production defaults: events 30 days after going inactive, assessments
    /// one year.
    fn default() -> Self {
        Self {
            active_event_days: 30,
            assessment_days: 365,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CleanupStats {
    pub events_deleted: u64,
    pub assessments_deleted: u64,
}

pub struct RetentionCleanup {
    pool: PgPool,
    policy: RetentionPolicy,
}

impl RetentionCleanup {
    pub fn new(pool: PgPool, policy: RetentionPolicy) -> Self {
        Self { pool, policy }
    }

    /// Apply both policies. Row counts are logged and returned, nothing else
    /// depends on them.
    pub async fn run(&self) -> Result<CleanupStats> {
        let events_deleted = sqlx::query(
            r#"
            DELETE FROM active_events
            WHERE status <> 'active'
              AND updated_at < now() - make_interval(days => $1)
            "#,
        )
        .bind(self.policy.active_event_days)
        .execute(&self.pool)
        .await?
        .rows_affected();

        // The correlated MAX keeps each parcel's newest assessment alive
        // regardless of age.
        let assessments_deleted = sqlx::query(
            r#"
            DELETE FROM parcel_risk_assessments a
            WHERE a.assessment_date < CURRENT_DATE - $1
              AND a.assessment_date <> (
                  SELECT MAX(b.assessment_date)
                  FROM parcel_risk_assessments b
                  WHERE b.county_fips = a.county_fips
                    AND b.parcel_id = a.parcel_id
              )
            "#,
        )
        .bind(self.policy.assessment_days)
        .execute(&self.pool)
        .await?
        .rows_affected();

        info!(events_deleted, assessments_deleted, "Retention cleanup complete");
        Ok(CleanupStats {
            events_deleted,
            assessments_deleted,
        })
    }
}
