//! Batch risk assessment driver.
//!
//! Pages over every parcel in stable key order, scores each one, and upserts
//! the result keyed by (county, parcel, assessment date). One transaction per
//! page bounds both transaction size and the blast radius of a failure:
//!
//! - a failure scoring one parcel is logged with the parcel's identity and
//!   skipped — the page continues;
//! - a failure committing a page halts the run at that offset. There is no
//!   automatic resume; re-invocation restarts from page 1 and the upsert key
//!   makes that safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use stormrisk_common::{Result, StormRiskError};
use stormrisk_risk::{RiskScore, RiskScorer};

use crate::parcel_store::{ParcelRow, ParcelStore};
use crate::spatial::{FACILITY_FIRE_STATION, FACILITY_HOSPITAL};
use crate::traits::SpatialQueries;

pub const DEFAULT_PAGE_SIZE: i64 = 1000;

/// Driver state over one run. A run that returns `Err` halted at the offset
/// carried by [`StormRiskError::PageCommit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    InProgress { offset: i64 },
    Complete,
    /// A cancellation request was honored at a page boundary.
    Cancelled { offset: i64 },
}

/// Counts from one driver run.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRunStats {
    pub assessment_date: NaiveDate,
    pub total_parcels: i64,
    pub scored: u64,
    pub skipped: u64,
    pub pages_committed: u32,
    pub state: RunState,
}

pub struct AssessmentDriver {
    pool: PgPool,
    parcels: ParcelStore,
    scorer: RiskScorer,
    spatial: Arc<dyn SpatialQueries>,
    page_size: i64,
    cancel: Option<Arc<AtomicBool>>,
}

impl AssessmentDriver {
    pub fn new(pool: PgPool, scorer: RiskScorer, spatial: Arc<dyn SpatialQueries>) -> Self {
        Self {
            parcels: ParcelStore::new(pool.clone()),
            pool,
            scorer,
            spatial,
            page_size: DEFAULT_PAGE_SIZE,
            cancel: None,
        }
    }

    /// Override the page size. Non-positive values are rejected (a zero page
    /// would loop forever on a non-empty table) and the current size kept.
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        if page_size < 1 {
            warn!(page_size, "Ignoring non-positive page size");
            return self;
        }
        self.page_size = page_size;
        self
    }

    /// Attach a cancellation flag, checked at page boundaries only. Work
    /// inside a page always runs to its commit.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Assess every parcel for today's date.
    pub async fn run(&self) -> Result<AssessmentRunStats> {
        self.run_for_date(Utc::now().date_naive()).await
    }

    /// Assess every parcel for an explicit date. Re-running for the same date
    /// overwrites rather than duplicates.
    pub async fn run_for_date(&self, assessment_date: NaiveDate) -> Result<AssessmentRunStats> {
        let total_parcels = self.parcels.count().await?;
        info!(total_parcels, %assessment_date, "Starting parcel risk assessment run");

        let mut stats = AssessmentRunStats {
            assessment_date,
            total_parcels,
            scored: 0,
            skipped: 0,
            pages_committed: 0,
            state: RunState::Pending,
        };

        let mut offset: i64 = 0;
        loop {
            if let Some(cancel) = &self.cancel {
                if cancel.load(Ordering::Relaxed) {
                    info!(offset, "Cancellation requested; stopping at page boundary");
                    stats.state = RunState::Cancelled { offset };
                    return Ok(stats);
                }
            }

            stats.state = RunState::InProgress { offset };
            let page = self.parcels.page(self.page_size, offset).await?;
            if page.is_empty() {
                break;
            }

            let mut tx = self.pool.begin().await?;
            for parcel in &page {
                match self.assess_one(&mut tx, parcel, assessment_date).await {
                    Ok(()) => stats.scored += 1,
                    Err(e) => {
                        // Scoring one parcel failed; log it and keep the
                        // page alive.
                        warn!(
                            county_fips = %parcel.county_fips,
                            parcel_id = %parcel.parcel_id,
                            error = %e,
                            "Failed to assess parcel; skipping"
                        );
                        stats.skipped += 1;
                    }
                }
            }

            tx.commit()
                .await
                .map_err(|source| StormRiskError::PageCommit { offset, source })?;
            stats.pages_committed += 1;

            offset += page.len() as i64;
            info!(
                processed = offset,
                total = total_parcels,
                "Assessment page committed"
            );
        }

        stats.state = RunState::Complete;
        info!(
            scored = stats.scored,
            skipped = stats.skipped,
            pages = stats.pages_committed,
            "Parcel risk assessment run complete"
        );
        Ok(stats)
    }

    async fn assess_one(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        parcel: &ParcelRow,
        assessment_date: NaiveDate,
    ) -> Result<()> {
        let score = self.scorer.score(&parcel.to_attributes());

        let nearest_fire_station_km = self
            .spatial
            .nearest_facility_km(&parcel.county_fips, &parcel.parcel_id, FACILITY_FIRE_STATION)
            .await?;
        let nearest_hospital_km = self
            .spatial
            .nearest_facility_km(&parcel.county_fips, &parcel.parcel_id, FACILITY_HOSPITAL)
            .await?;
        let hazard_zones = self
            .spatial
            .intersecting_hazard_zones(&parcel.county_fips, &parcel.parcel_id)
            .await?;

        let row = NewAssessment {
            county_fips: &parcel.county_fips,
            parcel_id: &parcel.parcel_id,
            assessment_date,
            score: &score,
            nearest_fire_station_km,
            nearest_hospital_km,
            hazard_zones,
        };
        row.upsert(&mut **tx).await
    }
}

/// Insert-or-overwrite parameters for one assessment row.
pub struct NewAssessment<'a> {
    pub county_fips: &'a str,
    pub parcel_id: &'a str,
    pub assessment_date: NaiveDate,
    pub score: &'a RiskScore,
    pub nearest_fire_station_km: Option<f64>,
    pub nearest_hospital_km: Option<f64>,
    pub hazard_zones: Vec<String>,
}

impl NewAssessment<'_> {
    /// Upsert on the (county, parcel, date) natural key. A conflict overwrites
    /// every score field and bumps `updated_at`.
    pub async fn upsert(&self, conn: &mut PgConnection) -> Result<()> {
        let c = &self.score.components;
        sqlx::query(
            r#"
            INSERT INTO parcel_risk_assessments
                (county_fips, parcel_id, assessment_date,
                 hurricane_historical, wind_vulnerability, surge_exposure,
                 economic_factor, geographic_factor,
                 composite_score, risk_category, confidence,
                 nearest_fire_station_km, nearest_hospital_km, hazard_zones)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (county_fips, parcel_id, assessment_date) DO UPDATE SET
                hurricane_historical = EXCLUDED.hurricane_historical,
                wind_vulnerability = EXCLUDED.wind_vulnerability,
                surge_exposure = EXCLUDED.surge_exposure,
                economic_factor = EXCLUDED.economic_factor,
                geographic_factor = EXCLUDED.geographic_factor,
                composite_score = EXCLUDED.composite_score,
                risk_category = EXCLUDED.risk_category,
                confidence = EXCLUDED.confidence,
                nearest_fire_station_km = EXCLUDED.nearest_fire_station_km,
                nearest_hospital_km = EXCLUDED.nearest_hospital_km,
                hazard_zones = EXCLUDED.hazard_zones,
                updated_at = now()
            "#,
        )
        .bind(self.county_fips)
        .bind(self.parcel_id)
        .bind(self.assessment_date)
        .bind(c.hurricane_historical)
        .bind(c.wind_vulnerability)
        .bind(c.surge_exposure)
        .bind(c.economic_factor)
        .bind(c.geographic_factor)
        .bind(self.score.composite)
        .bind(self.score.category.as_str())
        .bind(self.score.confidence)
        .bind(self.nearest_fire_station_km)
        .bind(self.nearest_hospital_km)
        .bind(&self.hazard_zones)
        .execute(conn)
        .await?;
        Ok(())
    }
}
