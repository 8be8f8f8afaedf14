use serde::{Deserialize, Serialize};

/// Risk category derived from a composite score via fixed thresholds.
/// Stored as uppercase text in `parcel_risk_assessments.risk_category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Minimal,
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskCategory {
    /// Category boundaries: >= 0.8 EXTREME, >= 0.6 HIGH, >= 0.4 MODERATE,
    /// >= 0.2 LOW, else MINIMAL.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskCategory::Extreme
        } else if score >= 0.6 {
            RiskCategory::High
        } else if score >= 0.4 {
            RiskCategory::Moderate
        } else if score >= 0.2 {
            RiskCategory::Low
        } else {
            RiskCategory::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Minimal => "MINIMAL",
            RiskCategory::Low => "LOW",
            RiskCategory::Moderate => "MODERATE",
            RiskCategory::High => "HIGH",
            RiskCategory::Extreme => "EXTREME",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ParcelLinkage,
    RiskAssessment,
    EventImpacts,
    Statistics,
    Cleanup,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::ParcelLinkage => "parcel_linkage",
            PipelineStage::RiskAssessment => "risk_assessment",
            PipelineStage::EventImpacts => "event_impacts",
            PipelineStage::Statistics => "statistics",
            PipelineStage::Cleanup => "cleanup",
        }
    }

    /// Full pipeline order: linkage -> assessment -> impacts -> stats -> cleanup.
    pub fn all() -> [PipelineStage; 5] {
        [
            PipelineStage::ParcelLinkage,
            PipelineStage::RiskAssessment,
            PipelineStage::EventImpacts,
            PipelineStage::Statistics,
            PipelineStage::Cleanup,
        ]
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(RiskCategory::from_score(0.0), RiskCategory::Minimal);
        assert_eq!(RiskCategory::from_score(0.19999), RiskCategory::Minimal);
        assert_eq!(RiskCategory::from_score(0.2), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(0.4), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_score(0.6), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(0.8), RiskCategory::Extreme);
        assert_eq!(RiskCategory::from_score(1.0), RiskCategory::Extreme);
    }

    #[test]
    fn category_serializes_uppercase() {
        let json = serde_json::to_string(&RiskCategory::Moderate).unwrap();
        assert_eq!(json, "\"MODERATE\"");
    }

    #[test]
    fn stage_order_matches_pipeline_sequence() {
        let stages = PipelineStage::all();
        assert_eq!(stages[0], PipelineStage::ParcelLinkage);
        assert_eq!(stages[4], PipelineStage::Cleanup);
    }
}
