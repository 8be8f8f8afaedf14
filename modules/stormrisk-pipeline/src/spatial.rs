use async_trait::async_trait;
use sqlx::PgPool;

use stormrisk_common::Result;

use crate::traits::SpatialQueries;

/// Facility types the assessment driver asks about.
pub const FACILITY_FIRE_STATION: &str = "fire_station";
pub const FACILITY_HOSPITAL: &str = "hospital";

/// PostGIS-backed spatial queries over the `facilities` and `hazard_zones`
/// tables.
#[derive(Clone)]
pub struct PgSpatialStore {
    pool: PgPool,
}

impl PgSpatialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpatialQueries for PgSpatialStore {
    async fn nearest_facility_km(
        &self,
        county_fips: &str,
        parcel_id: &str,
        facility_type: &str,
    ) -> Result<Option<f64>> {
        // KNN index order (<->) picks the candidate; geography cast gives
        // meters for the reported distance.
        let km = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT ST_Distance(p.geom::geography, f.geom::geography) / 1000.0
            FROM parcels p
            JOIN facilities f ON f.facility_type = $3
            WHERE p.county_fips = $1 AND p.parcel_id = $2
            ORDER BY p.geom <-> f.geom
            LIMIT 1
            "#,
        )
        .bind(county_fips)
        .bind(parcel_id)
        .bind(facility_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(km)
    }

    async fn intersecting_hazard_zones(
        &self,
        county_fips: &str,
        parcel_id: &str,
    ) -> Result<Vec<String>> {
        let zones = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT hz.zone_code
            FROM parcels p
            JOIN hazard_zones hz ON ST_Intersects(p.geom, hz.geom)
            WHERE p.county_fips = $1 AND p.parcel_id = $2
            ORDER BY hz.zone_code
            "#,
        )
        .bind(county_fips)
        .bind(parcel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(zones)
    }
}
