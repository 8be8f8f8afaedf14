use typed_builder::TypedBuilder;

/// Defaults substituted for missing parcel attributes.
///
/// County assessor extracts are patchy; these keep scoring total without
/// hiding the substitution behind magic numbers. Each is overridable by
/// setting the attribute explicitly.
pub mod defaults {
    /// Inland fallback when no coastline distance was computed.
    pub const DISTANCE_TO_COAST_KM: f64 = 50.0;
    /// Typical Florida lowland elevation.
    pub const ELEVATION_FT: f64 = 10.0;
    pub const BUILDING_AGE_YEARS: f64 = 30.0;
    pub const ASSESSED_VALUE: f64 = 100_000.0;
    /// Central-Florida latitude, lands in the lowest geographic band.
    pub const LATITUDE: f64 = 27.0;
    pub const HURRICANE_COUNT_20YR: i32 = 0;
    pub const MAX_WIND_KTS: f64 = 0.0;
    pub const LOT_SIZE_SQFT: f64 = 8_000.0;
    pub const BUILDING_SQFT: f64 = 1_500.0;
}

/// Raw parcel attributes as they come off the assessor record.
///
/// Optional fields cover attributes the source data may not carry; accessors
/// apply the [`defaults`] so scoring code never branches on `None`.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ParcelAttributes {
    #[builder(setter(into))]
    pub parcel_id: String,
    /// Five-digit county FIPS, e.g. "12087" for Monroe.
    #[builder(setter(into))]
    pub county_fips: String,
    #[builder(default, setter(strip_option))]
    pub latitude: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub longitude: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub hurricane_count_20yr: Option<i32>,
    #[builder(default, setter(strip_option))]
    pub max_wind_kts: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub building_age_years: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub elevation_ft: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub distance_to_coast_km: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub assessed_value: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub lot_size_sqft: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub building_sqft: Option<f64>,
}

impl ParcelAttributes {
    pub fn latitude_or_default(&self) -> f64 {
        self.latitude.unwrap_or(defaults::LATITUDE)
    }

    pub fn hurricane_count_or_default(&self) -> i32 {
        self.hurricane_count_20yr
            .unwrap_or(defaults::HURRICANE_COUNT_20YR)
    }

    pub fn max_wind_or_default(&self) -> f64 {
        self.max_wind_kts.unwrap_or(defaults::MAX_WIND_KTS)
    }

    pub fn building_age_or_default(&self) -> f64 {
        self.building_age_years
            .unwrap_or(defaults::BUILDING_AGE_YEARS)
    }

    pub fn elevation_or_default(&self) -> f64 {
        self.elevation_ft.unwrap_or(defaults::ELEVATION_FT)
    }

    pub fn distance_to_coast_or_default(&self) -> f64 {
        self.distance_to_coast_km
            .unwrap_or(defaults::DISTANCE_TO_COAST_KM)
    }

    pub fn assessed_value_or_default(&self) -> f64 {
        self.assessed_value.unwrap_or(defaults::ASSESSED_VALUE)
    }

    pub fn lot_size_or_default(&self) -> f64 {
        self.lot_size_sqft.unwrap_or(defaults::LOT_SIZE_SQFT)
    }

    pub fn building_sqft_or_default(&self) -> f64 {
        self.building_sqft.unwrap_or(defaults::BUILDING_SQFT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attributes_fall_back_to_documented_defaults() {
        let attrs = ParcelAttributes::builder()
            .parcel_id("12015-000001")
            .county_fips("12015")
            .build();

        assert_eq!(attrs.distance_to_coast_or_default(), defaults::DISTANCE_TO_COAST_KM);
        assert_eq!(attrs.elevation_or_default(), defaults::ELEVATION_FT);
        assert_eq!(attrs.building_age_or_default(), defaults::BUILDING_AGE_YEARS);
        assert_eq!(attrs.assessed_value_or_default(), defaults::ASSESSED_VALUE);
        assert_eq!(attrs.latitude_or_default(), defaults::LATITUDE);
        assert_eq!(attrs.hurricane_count_or_default(), 0);
        assert_eq!(attrs.max_wind_or_default(), 0.0);
    }

    #[test]
    fn explicit_attributes_override_defaults() {
        let attrs = ParcelAttributes::builder()
            .parcel_id("12087-001234")
            .county_fips("12087")
            .elevation_ft(8.0)
            .distance_to_coast_km(0.5)
            .build();

        assert_eq!(attrs.elevation_or_default(), 8.0);
        assert_eq!(attrs.distance_to_coast_or_default(), 0.5);
    }
}
