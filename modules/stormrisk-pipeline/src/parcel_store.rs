use sqlx::PgPool;

use stormrisk_common::Result;
use stormrisk_risk::ParcelAttributes;

/// Read-only access to the `parcels` reference table.
///
/// Pages are ordered by the stable `(county_fips, parcel_id)` key so a batch
/// traversal is deterministic and resumable.
#[derive(Clone)]
pub struct ParcelStore {
    pool: PgPool,
}

/// One parcel row, as much of it as risk scoring needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParcelRow {
    pub parcel_id: String,
    pub county_fips: String,
    pub county_name: String,
    pub centroid_lat: Option<f64>,
    pub centroid_lon: Option<f64>,
    pub just_value: Option<f64>,
    pub building_age_years: Option<f64>,
    pub building_sqft: Option<f64>,
    pub lot_size_sqft: Option<f64>,
    pub elevation_ft: Option<f64>,
    pub distance_to_coast_km: Option<f64>,
    pub hurricane_count_20yr: Option<i32>,
    pub max_wind_kts: Option<f64>,
}

impl ParcelRow {
    /// Lift the row into scoring attributes. Missing columns stay `None`;
    /// the scorer applies its documented defaults.
    pub fn to_attributes(&self) -> ParcelAttributes {
        ParcelAttributes {
            parcel_id: self.parcel_id.clone(),
            county_fips: self.county_fips.clone(),
            latitude: self.centroid_lat,
            longitude: self.centroid_lon,
            hurricane_count_20yr: self.hurricane_count_20yr,
            max_wind_kts: self.max_wind_kts,
            building_age_years: self.building_age_years,
            elevation_ft: self.elevation_ft,
            distance_to_coast_km: self.distance_to_coast_km,
            assessed_value: self.just_value,
            lot_size_sqft: self.lot_size_sqft,
            building_sqft: self.building_sqft,
        }
    }
}

impl ParcelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parcels")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// One fixed-size page of parcels in stable key order.
    pub async fn page(&self, limit: i64, offset: i64) -> Result<Vec<ParcelRow>> {
        let rows = sqlx::query_as::<_, ParcelRow>(
            r#"
            SELECT parcel_id, county_fips, county_name,
                   centroid_lat, centroid_lon,
                   just_value, building_age_years, building_sqft, lot_size_sqft,
                   elevation_ft, distance_to_coast_km,
                   hurricane_count_20yr, max_wind_kts
            FROM parcels
            ORDER BY county_fips, parcel_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
