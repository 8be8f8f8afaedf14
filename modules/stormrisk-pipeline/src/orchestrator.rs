//! Pipeline orchestrator.
//!
//! Sequences linkage -> assessment -> impacts -> statistics -> cleanup. Each
//! stage is independently invocable for ad-hoc runs. A stage failure writes a
//! structured record to `system_logs` and halts the remaining stages; there
//! are no retries here — the external scheduler re-invokes, and stage
//! idempotence makes that safe.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, info};

use stormrisk_common::{Config, PipelineStage, Result, StormRiskError};
use stormrisk_risk::RiskScorer;

use crate::assess::AssessmentDriver;
use crate::cleanup::{RetentionCleanup, RetentionPolicy};
use crate::impact::ImpactDetector;
use crate::linkage::ParcelLinker;
use crate::spatial::PgSpatialStore;
use crate::stats::StatisticsAggregator;
use crate::syslog::SystemLog;
use crate::traits::SpatialQueries;

/// Final status of a full pipeline run. Partial means at least one stage
/// completed before a later one failed — not collapsed into a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

/// What one stage did, for the final report.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    pub stage: PipelineStage,
    /// Rows linked / parcels scored / notifications created / metric rows /
    /// rows deleted, depending on the stage.
    pub rows: u64,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Report from one orchestrated run: per-stage counts plus an overall status.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub stages: Vec<StageOutcome>,
}

impl RunReport {
    /// Success if every stage ran clean, Failed if nothing completed,
    /// Partial otherwise.
    pub fn derive_status(outcomes: &[StageOutcome]) -> RunStatus {
        let failed = outcomes.iter().any(|o| o.error.is_some());
        let succeeded = outcomes.iter().filter(|o| o.error.is_none()).count();
        match (failed, succeeded) {
            (false, _) => RunStatus::Success,
            (true, 0) => RunStatus::Failed,
            (true, _) => RunStatus::Partial,
        }
    }
}

pub struct Pipeline {
    pool: PgPool,
    scorer: RiskScorer,
    spatial: Arc<dyn SpatialQueries>,
    syslog: SystemLog,
    page_size: i64,
    similarity_threshold: f64,
    retention: RetentionPolicy,
}

impl Pipeline {
    pub fn new(pool: PgPool, scorer: RiskScorer) -> Self {
        Self {
            spatial: Arc::new(PgSpatialStore::new(pool.clone())),
            syslog: SystemLog::new(pool.clone()),
            pool,
            scorer,
            page_size: crate::assess::DEFAULT_PAGE_SIZE,
            similarity_threshold: crate::linkage::DEFAULT_SIMILARITY_THRESHOLD,
            retention: RetentionPolicy::default(),
        }
    }

    pub fn from_config(pool: PgPool, scorer: RiskScorer, config: &Config) -> Self {
        let mut p = Self::new(pool, scorer);
        p.page_size = config.assess_page_size;
        p.similarity_threshold = config.linkage_similarity_threshold;
        p.retention = RetentionPolicy {
            active_event_days: config.event_retention_days,
            assessment_days: config.assessment_retention_days,
        };
        p
    }

    /// Swap the spatial collaborator, mainly for tests.
    pub fn with_spatial(mut self, spatial: Arc<dyn SpatialQueries>) -> Self {
        self.spatial = spatial;
        self
    }

    // --- Independently invocable stages ---

    pub async fn link_properties(&self, county: Option<&str>) -> Result<u64> {
        ParcelLinker::new(self.pool.clone())
            .with_similarity_threshold(self.similarity_threshold)
            .link_unlinked(county)
            .await
            .map_err(|e| stage_err(PipelineStage::ParcelLinkage, e))
    }

    pub async fn assess_risk(&self) -> Result<u64> {
        let stats = AssessmentDriver::new(self.pool.clone(), self.scorer.clone(), self.spatial.clone())
            .with_page_size(self.page_size)
            .run()
            .await
            .map_err(|e| stage_err(PipelineStage::RiskAssessment, e))?;
        Ok(stats.scored)
    }

    pub async fn detect_impacts(&self) -> Result<u64> {
        ImpactDetector::new(self.pool.clone())
            .detect()
            .await
            .map_err(|e| stage_err(PipelineStage::EventImpacts, e))
    }

    pub async fn generate_statistics(&self) -> Result<u64> {
        let outcome = StatisticsAggregator::new(self.pool.clone())
            .generate()
            .await
            .map_err(|e| stage_err(PipelineStage::Statistics, e))?;
        Ok(outcome.county_rows + outcome.portfolio_rows)
    }

    pub async fn cleanup(&self) -> Result<u64> {
        let stats = RetentionCleanup::new(self.pool.clone(), self.retention)
            .run()
            .await
            .map_err(|e| stage_err(PipelineStage::Cleanup, e))?;
        Ok(stats.events_deleted + stats.assessments_deleted)
    }

    async fn run_stage(&self, stage: PipelineStage) -> Result<u64> {
        match stage {
            PipelineStage::ParcelLinkage => self.link_properties(None).await,
            PipelineStage::RiskAssessment => self.assess_risk().await,
            PipelineStage::EventImpacts => self.detect_impacts().await,
            PipelineStage::Statistics => self.generate_statistics().await,
            PipelineStage::Cleanup => self.cleanup().await,
        }
    }

    /// Run the full five-stage sequence. A stage failure halts the remaining
    /// stages; the report carries what completed and what did not.
    pub async fn run_full(&self) -> RunReport {
        let started_at = Utc::now();
        let run_timer = Instant::now();
        info!("Starting full risk pipeline run");

        let mut stages = Vec::with_capacity(PipelineStage::all().len());
        for stage in PipelineStage::all() {
            let timer = Instant::now();
            match self.run_stage(stage).await {
                Ok(rows) => {
                    info!(%stage, rows, "Pipeline stage complete");
                    stages.push(StageOutcome {
                        stage,
                        rows,
                        duration_ms: timer.elapsed().as_millis() as u64,
                        error: None,
                    });
                }
                Err(e) => {
                    error!(%stage, error = %e, "Pipeline stage failed; halting run");
                    self.syslog
                        .record(
                            "error",
                            "Risk pipeline stage failed",
                            json!({
                                "stage": stage.as_str(),
                                "error": e.to_string(),
                                "timestamp": Utc::now(),
                            }),
                        )
                        .await;
                    stages.push(StageOutcome {
                        stage,
                        rows: 0,
                        duration_ms: timer.elapsed().as_millis() as u64,
                        error: Some(e.to_string()),
                    });
                    break;
                }
            }
        }

        let status = RunReport::derive_status(&stages);
        if status == RunStatus::Success {
            self.syslog
                .record(
                    "info",
                    "Risk pipeline completed successfully",
                    json!({
                        "duration_seconds": run_timer.elapsed().as_secs_f64(),
                        "timestamp": Utc::now(),
                    }),
                )
                .await;
        }

        info!(?status, "Full risk pipeline run finished");
        RunReport {
            started_at,
            finished_at: Utc::now(),
            status,
            stages,
        }
    }
}

fn stage_err(stage: PipelineStage, e: StormRiskError) -> StormRiskError {
    match e {
        already @ StormRiskError::Stage { .. } => already,
        other => StormRiskError::Stage {
            stage,
            source: anyhow::Error::new(other),
        },
    }
}
