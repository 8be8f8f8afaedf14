use serde::{Deserialize, Serialize};

use crate::attributes::ParcelAttributes;

/// Monroe County (the Florida Keys) carries an extreme base geographic risk.
pub const MONROE_COUNTY_FIPS: &str = "12087";

/// Hurricane count that saturates the historical component.
pub const HURRICANE_SATURATION_COUNT: f64 = 8.0;
/// Wind speed (knots) that saturates the wind term.
pub const WIND_SATURATION_KTS: f64 = 150.0;
/// Building age (years) that saturates the vulnerability term.
pub const AGE_SATURATION_YEARS: f64 = 50.0;
/// Elevation (feet) at which surge exposure reaches zero.
pub const SURGE_ELEVATION_FT: f64 = 20.0;
/// Coastal distance (km) at which surge exposure reaches zero.
pub const SURGE_COAST_KM: f64 = 10.0;
/// Assessed value that saturates the economic component.
pub const VALUE_SATURATION: f64 = 2_000_000.0;

/// Individual risk component scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    /// Historical hurricane impacts over the trailing 20 years.
    pub hurricane_historical: f64,
    /// Building characteristics vs. observed wind exposure.
    pub wind_vulnerability: f64,
    /// Elevation and coastal distance vs. storm surge.
    pub surge_exposure: f64,
    /// Assessed value as a proxy for economic exposure.
    pub economic_factor: f64,
    /// Latitude band plus the Keys premium.
    pub geographic_factor: f64,
}

impl RiskComponents {
    /// Compute all five components from parcel attributes. Deterministic;
    /// missing attributes use the documented defaults.
    pub fn from_attributes(attrs: &ParcelAttributes) -> Self {
        let hurricane_historical =
            (attrs.hurricane_count_or_default() as f64 / HURRICANE_SATURATION_COUNT).min(1.0);

        let wind_vulnerability = ((attrs.max_wind_or_default() / WIND_SATURATION_KTS)
            * (attrs.building_age_or_default() / AGE_SATURATION_YEARS))
            .min(1.0);

        let surge_exposure = (1.0
            - attrs.elevation_or_default() / SURGE_ELEVATION_FT
            - attrs.distance_to_coast_or_default() / SURGE_COAST_KM)
            .max(0.0);

        let economic_factor = (attrs.assessed_value_or_default() / VALUE_SATURATION).min(1.0);

        let geographic_factor = geographic_factor(attrs.latitude_or_default(), &attrs.county_fips);

        RiskComponents {
            hurricane_historical,
            wind_vulnerability,
            surge_exposure,
            economic_factor,
            geographic_factor,
        }
    }
}

/// South Florida latitude bands plus the Keys premium, capped at 1.0.
fn geographic_factor(latitude: f64, county_fips: &str) -> f64 {
    let south_florida_factor: f64 = if latitude < 26.5 {
        1.0
    } else if latitude < 27.5 {
        0.7
    } else {
        0.5
    };
    let keys_factor = if county_fips == MONROE_COUNTY_FIPS {
        1.0
    } else {
        0.0
    };
    (south_florida_factor + keys_factor).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_parcel() -> ParcelAttributes {
        ParcelAttributes::builder()
            .parcel_id("12087-001234")
            .county_fips("12087")
            .latitude(24.7)
            .hurricane_count_20yr(6)
            .max_wind_kts(140.0)
            .building_age_years(25.0)
            .elevation_ft(8.0)
            .distance_to_coast_km(0.5)
            .assessed_value(800_000.0)
            .build()
    }

    #[test]
    fn monroe_keys_parcel_component_scores() {
        let c = RiskComponents::from_attributes(&keys_parcel());

        assert!((c.hurricane_historical - 0.75).abs() < 1e-9);
        // (140/150) * (25/50) = 0.4666...
        assert!((c.wind_vulnerability - 140.0 / 150.0 * 0.5).abs() < 1e-9);
        // 1 - 8/20 - 0.5/10 = 0.55
        assert!((c.surge_exposure - 0.55).abs() < 1e-9);
        assert!((c.economic_factor - 0.4).abs() < 1e-9);
        // south_florida 1.0 + keys 1.0, capped at 1.0
        assert!((c.geographic_factor - 1.0).abs() < 1e-9);
    }

    #[test]
    fn charlotte_county_drops_geographic_factor() {
        let attrs = ParcelAttributes::builder()
            .parcel_id("12015-005678")
            .county_fips("12015")
            .latitude(26.9)
            .build();
        let c = RiskComponents::from_attributes(&attrs);

        // 26.5 <= lat < 27.5 band, no Keys premium
        assert!((c.geographic_factor - 0.7).abs() < 1e-9);
    }

    #[test]
    fn latitude_bands() {
        for (lat, expected) in [(24.0, 1.0), (26.49, 1.0), (26.5, 0.7), (27.49, 0.7), (27.5, 0.5), (30.0, 0.5)] {
            assert_eq!(geographic_factor(lat, "12015"), expected, "lat {lat}");
        }
    }

    #[test]
    fn components_stay_in_unit_interval_at_extremes() {
        let extreme = ParcelAttributes::builder()
            .parcel_id("x")
            .county_fips("12087")
            .latitude(24.0)
            .hurricane_count_20yr(40)
            .max_wind_kts(300.0)
            .building_age_years(120.0)
            .elevation_ft(0.0)
            .distance_to_coast_km(0.0)
            .assessed_value(50_000_000.0)
            .build();
        let c = RiskComponents::from_attributes(&extreme);

        for v in [
            c.hurricane_historical,
            c.wind_vulnerability,
            c.surge_exposure,
            c.economic_factor,
            c.geographic_factor,
        ] {
            assert!((0.0..=1.0).contains(&v), "component out of range: {v}");
        }
    }

    #[test]
    fn high_elevation_inland_parcel_has_zero_surge_exposure() {
        let attrs = ParcelAttributes::builder()
            .parcel_id("x")
            .county_fips("12001")
            .elevation_ft(80.0)
            .distance_to_coast_km(120.0)
            .build();
        let c = RiskComponents::from_attributes(&attrs);
        assert_eq!(c.surge_exposure, 0.0);
    }
}
