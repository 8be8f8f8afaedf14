use async_trait::async_trait;
use stormrisk_common::Result;

/// Spatial collaborator consumed by the assessment driver.
///
/// Implementations answer two questions about a parcel's geometry: how far is
/// the nearest facility of a given type, and which hazard zones overlap it.
/// The Postgres implementation is [`crate::spatial::PgSpatialStore`]; tests
/// can substitute a fixture.
#[async_trait]
pub trait SpatialQueries: Send + Sync {
    /// Distance in kilometers from the parcel to the nearest facility of the
    /// given type, or `None` when no such facility is known.
    async fn nearest_facility_km(
        &self,
        county_fips: &str,
        parcel_id: &str,
        facility_type: &str,
    ) -> Result<Option<f64>>;

    /// Namespaced codes of all hazard zones intersecting the parcel.
    async fn intersecting_hazard_zones(
        &self,
        county_fips: &str,
        parcel_id: &str,
    ) -> Result<Vec<String>>;
}
