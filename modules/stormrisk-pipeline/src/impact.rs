//! Active-event impact detection.
//!
//! One set-based statement: spatially join every active event against parcels,
//! follow the parcel link to properties, and insert a notification per
//! qualifying (event, property) pair unless the same (user, event, property)
//! triple was already notified within the trailing dedup window. Being a
//! single statement, the whole run is atomic — all qualifying notifications
//! are created or none are — and there is no per-row insert race to manage.

use sqlx::PgPool;
use tracing::info;

use stormrisk_common::Result;

/// No repeat notification for the same (user, event, property) within this
/// trailing window.
pub const DEDUP_WINDOW_HOURS: i32 = 24;

pub struct ImpactDetector {
    pool: PgPool,
}

impl ImpactDetector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Detect impacts and create deduplicated notifications. Returns the
    /// number of notifications created; zero intersections is a normal,
    /// successful outcome.
    pub async fn detect(&self) -> Result<u64> {
        let created = sqlx::query(
            r#"
            WITH affected AS (
                SELECT
                    ae.id AS event_id,
                    ae.event_type,
                    ae.event_name,
                    p.id AS property_id,
                    p.user_id,
                    p.name AS property_name,
                    ST_Area(ST_Intersection(ae.geom, gp.geom)::geography) AS impact_area_sqm
                FROM active_events ae
                JOIN parcels gp ON ST_Intersects(ae.geom, gp.geom)
                JOIN properties p
                    ON p.parcel_id = gp.parcel_id AND p.county = gp.county_name
                WHERE ae.status = 'active'
            )
            INSERT INTO notifications
                (user_id, event_id, property_id, notification_type, title, message, impact_area_sqm)
            SELECT
                user_id,
                event_id,
                property_id,
                'hazard_alert',
                event_type || ' Alert',
                'Your property "' || property_name || '" may be affected by ' || event_name,
                impact_area_sqm
            FROM affected
            WHERE NOT EXISTS (
                SELECT 1 FROM notifications n
                WHERE n.user_id = affected.user_id
                  AND n.event_id = affected.event_id
                  AND n.property_id = affected.property_id
                  AND n.created_at > now() - make_interval(hours => $1)
            )
            "#,
        )
        .bind(DEDUP_WINDOW_HOURS)
        .execute(&self.pool)
        .await?
        .rows_affected();

        info!(created, "Active-event impact detection complete");
        Ok(created)
    }
}
