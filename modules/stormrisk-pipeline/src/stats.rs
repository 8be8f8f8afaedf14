//! Statistics aggregation over the current day's assessments.
//!
//! Read-only against assessments, append-only into `analytics_metrics`:
//! one summary row per county plus one portfolio-wide row, each tagged with
//! the insertion timestamp. Prior metric rows are never updated.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use stormrisk_common::Result;

pub const METRIC_TYPE: &str = "risk_assessment";
pub const COUNTY_METRIC: &str = "county_risk_summary";
pub const PORTFOLIO_METRIC: &str = "portfolio_risk_summary";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsOutcome {
    pub county_rows: u64,
    pub portfolio_rows: u64,
}

pub struct StatisticsAggregator {
    pool: PgPool,
}

impl StatisticsAggregator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append today's rollups. Counties without a same-day assessment simply
    /// produce no row.
    pub async fn generate(&self) -> Result<StatsOutcome> {
        let county_rows = sqlx::query(
            r#"
            INSERT INTO analytics_metrics (metric_type, metric_name, metric_value, dimensions)
            SELECT
                $1,
                $2,
                jsonb_build_object(
                    'avg_composite_risk', AVG(a.composite_score),
                    'high_risk_count', COUNT(*) FILTER (WHERE a.composite_score > 0.7),
                    'medium_risk_count', COUNT(*) FILTER (WHERE a.composite_score BETWEEN 0.3 AND 0.7),
                    'low_risk_count', COUNT(*) FILTER (WHERE a.composite_score < 0.3)
                ),
                jsonb_build_object('county', p.county_name)
            FROM parcels p
            JOIN parcel_risk_assessments a
                ON a.county_fips = p.county_fips AND a.parcel_id = p.parcel_id
            WHERE a.assessment_date = CURRENT_DATE
            GROUP BY p.county_name
            "#,
        )
        .bind(METRIC_TYPE)
        .bind(COUNTY_METRIC)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let portfolio_rows = sqlx::query(
            r#"
            INSERT INTO analytics_metrics (metric_type, metric_name, metric_value)
            SELECT
                $1,
                $2,
                jsonb_build_object(
                    'total_properties', COUNT(DISTINCT pr.id),
                    'avg_hurricane_historical', AVG(a.hurricane_historical),
                    'avg_wind_vulnerability', AVG(a.wind_vulnerability),
                    'avg_surge_exposure', AVG(a.surge_exposure),
                    'avg_economic_factor', AVG(a.economic_factor),
                    'avg_geographic_factor', AVG(a.geographic_factor),
                    'properties_in_flood_zone', COUNT(*) FILTER (
                        WHERE array_to_string(a.hazard_zones, ',') LIKE '%FLOOD%'
                    ),
                    'properties_in_wildfire_zone', COUNT(*) FILTER (
                        WHERE array_to_string(a.hazard_zones, ',') LIKE '%WILDFIRE%'
                    )
                )
            FROM properties pr
            JOIN parcels gp
                ON gp.parcel_id = pr.parcel_id AND gp.county_name = pr.county
            JOIN parcel_risk_assessments a
                ON a.county_fips = gp.county_fips AND a.parcel_id = gp.parcel_id
            WHERE a.assessment_date = CURRENT_DATE
            "#,
        )
        .bind(METRIC_TYPE)
        .bind(PORTFOLIO_METRIC)
        .execute(&self.pool)
        .await?
        .rows_affected();

        info!(county_rows, portfolio_rows, "Risk statistics generated");
        Ok(StatsOutcome {
            county_rows,
            portfolio_rows,
        })
    }
}
