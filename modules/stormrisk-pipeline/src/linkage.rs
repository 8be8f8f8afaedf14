//! Parcel-linkage resolver.
//!
//! Matches properties that have no parcel yet against assessor parcels in the
//! same county, exact address equality first, then trigram similarity. Only
//! rows where `parcel_id IS NULL` are touched, so a link, once set, is never
//! overwritten and the resolver is safe to re-run; unmatched properties stay
//! unlinked for the next run.

use sqlx::PgPool;
use tracing::info;

use stormrisk_common::Result;

/// Default pg_trgm similarity floor for the fuzzy pass. A production-tuned
/// business rule, not a derived value.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

pub struct ParcelLinker {
    pool: PgPool,
    similarity_threshold: f64,
}

impl ParcelLinker {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Link unlinked properties to parcels, optionally scoped to one county.
    /// Returns the number of properties linked. Exact matches are claimed
    /// before the fuzzy pass sees the remainder, both inside one transaction.
    pub async fn link_unlinked(&self, county: Option<&str>) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        // Pass (a): exact case-insensitive, whitespace-normalized match of
        // the constructed "{street} {city}, FL {zip}" string.
        let exact = sqlx::query(
            r#"
            UPDATE properties p
            SET parcel_id = gp.parcel_id
            FROM parcels gp
            WHERE p.parcel_id IS NULL
              AND p.county = gp.county_name
              AND ($1::text IS NULL OR p.county = $1)
              AND LOWER(TRIM(p.street_address || ' ' || p.city || ', FL ' || p.zip_code)) =
                  LOWER(TRIM(gp.property_address))
            "#,
        )
        .bind(county)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Pass (b): trigram similarity on normalized street + city.
        let fuzzy = sqlx::query(
            r#"
            UPDATE properties p
            SET parcel_id = gp.parcel_id
            FROM parcels gp
            WHERE p.parcel_id IS NULL
              AND p.county = gp.county_name
              AND ($1::text IS NULL OR p.county = $1)
              AND similarity(
                    LOWER(TRIM(p.street_address || ' ' || p.city)),
                    LOWER(TRIM(gp.property_address))
                  ) >= $2
            "#,
        )
        .bind(county)
        .bind(self.similarity_threshold)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        let linked = exact + fuzzy;
        info!(exact, fuzzy, linked, "Property-parcel linkage pass complete");
        Ok(linked)
    }
}
