//! Batch ETL core for parcel hurricane-risk assessment.
//!
//! Five stages run against Postgres (PostGIS + pg_trgm), sequenced by the
//! [`orchestrator::Pipeline`]:
//!
//! 1. **Parcel linkage** — match unlinked properties to parcels by address.
//! 2. **Risk assessment** — page over all parcels, score each, upsert one
//!    assessment row per parcel per calendar date.
//! 3. **Event impacts** — set-based spatial join of active events against
//!    linked parcels, deduplicated notifications.
//! 4. **Statistics** — append per-county and portfolio rollups.
//! 5. **Cleanup** — retention-based deletion, always keeping each parcel's
//!    latest assessment.
//!
//! All coordination happens through the database's transactional guarantees;
//! there is no cross-stage shared mutable state. Every stage is idempotent
//! under re-invocation, so an external scheduler can simply re-run the
//! orchestrator after a failure.

pub mod assess;
pub mod cleanup;
pub mod impact;
pub mod linkage;
pub mod orchestrator;
pub mod parcel_store;
pub mod spatial;
pub mod stats;
pub mod syslog;
pub mod traits;

pub use assess::{AssessmentDriver, AssessmentRunStats, RunState};
pub use cleanup::{CleanupStats, RetentionCleanup, RetentionPolicy};
pub use impact::ImpactDetector;
pub use linkage::ParcelLinker;
pub use orchestrator::{Pipeline, RunReport, RunStatus, StageOutcome};
pub use parcel_store::ParcelStore;
pub use spatial::PgSpatialStore;
pub use stats::{StatisticsAggregator, StatsOutcome};
pub use syslog::SystemLog;
pub use traits::SpatialQueries;

use sqlx::PgPool;
use stormrisk_common::Result;

/// Run the embedded SQL migrations. Requires the `postgis` and `pg_trgm`
/// extensions to be installable on the target database.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| stormrisk_common::StormRiskError::Database(e.into()))?;
    Ok(())
}
