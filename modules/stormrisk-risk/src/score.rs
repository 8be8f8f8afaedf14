use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use stormrisk_common::RiskCategory;

use crate::attributes::{defaults, ParcelAttributes};
use crate::components::RiskComponents;

/// Fallback composite weights, applied when no trained model is loaded.
pub const WEIGHT_HURRICANE: f64 = 0.25;
pub const WEIGHT_WIND: f64 = 0.25;
pub const WEIGHT_SURGE: f64 = 0.20;
pub const WEIGHT_ECONOMIC: f64 = 0.15;
pub const WEIGHT_GEOGRAPHIC: f64 = 0.15;

/// Confidence reported when a trained model produced the composite.
pub const MODEL_CONFIDENCE: f64 = 0.85;
/// Confidence reported for the weighted-average fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.60;

/// FIPS codes treated as high-risk for model feature engineering:
/// Miami-Dade, Monroe, Palm Beach, Martin.
pub const HIGH_RISK_COUNTIES: [&str; 4] = ["12086", "12087", "12099", "12111"];

/// A trained composite-risk predictor. Implementations wrap whatever
/// serialized model is deployed; the pipeline only sees this contract.
pub trait RiskModel: Send + Sync {
    /// Predict a composite score in [0, 1] from a [`feature_vector`].
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Complete risk assessment for one parcel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    pub parcel_id: String,
    /// Composite score, clamped to [0, 1].
    pub composite: f64,
    pub confidence: f64,
    pub components: RiskComponents,
    pub category: RiskCategory,
}

/// Scores parcels, preferring a trained model when one is loaded.
#[derive(Clone, Default)]
pub struct RiskScorer {
    model: Option<Arc<dyn RiskModel>>,
}

impl RiskScorer {
    /// Scorer using the weighted-average fallback only.
    pub fn new() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: Arc<dyn RiskModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Score a single parcel. Component scores are always the closed-form
    /// values; the composite comes from the model when available, otherwise
    /// the weighted average. A model prediction error falls back to the
    /// weighted average rather than failing the parcel.
    pub fn score(&self, attrs: &ParcelAttributes) -> RiskScore {
        let components = RiskComponents::from_attributes(attrs);

        let (raw, confidence) = match &self.model {
            Some(model) => match model.predict(&feature_vector(attrs)) {
                Ok(predicted) => (predicted, MODEL_CONFIDENCE),
                Err(_) => (weighted_average(&components), FALLBACK_CONFIDENCE),
            },
            None => (weighted_average(&components), FALLBACK_CONFIDENCE),
        };

        let composite = raw.clamp(0.0, 1.0);

        RiskScore {
            parcel_id: attrs.parcel_id.clone(),
            composite,
            confidence,
            components,
            category: RiskCategory::from_score(composite),
        }
    }
}

fn weighted_average(c: &RiskComponents) -> f64 {
    c.hurricane_historical * WEIGHT_HURRICANE
        + c.wind_vulnerability * WEIGHT_WIND
        + c.surge_exposure * WEIGHT_SURGE
        + c.economic_factor * WEIGHT_ECONOMIC
        + c.geographic_factor * WEIGHT_GEOGRAPHIC
}

/// Feature vector in the order the trained model expects. Must stay in sync
/// with the model's training pipeline; reordering silently breaks predictions.
pub fn feature_vector(attrs: &ParcelAttributes) -> Vec<f64> {
    let value = attrs.assessed_value_or_default();
    let building_sqft = attrs.building_sqft_or_default();
    let coast = attrs.distance_to_coast_or_default();
    let elevation = attrs.elevation_or_default();
    let high_risk_county = if HIGH_RISK_COUNTIES.contains(&attrs.county_fips.as_str()) {
        1.0
    } else {
        0.0
    };

    vec![
        attrs.latitude_or_default(),
        attrs.longitude.unwrap_or(0.0),
        coast,
        elevation,
        value,
        attrs.building_age_or_default(),
        attrs.lot_size_or_default(),
        building_sqft,
        attrs.hurricane_count_or_default() as f64,
        attrs.max_wind_or_default(),
        value / building_sqft.max(1.0),
        (coast / defaults::DISTANCE_TO_COAST_KM).min(1.0),
        (elevation / 50.0).min(1.0),
        high_risk_county,
    ]
}
