//! Hurricane risk scoring for Florida parcels.
//!
//! Pure domain crate, no I/O. Combines historical hurricane exposure,
//! building characteristics, and geographic factors into five component
//! scores and a composite in [0, 1]. An optional trained model can replace
//! the weighted-average composite; the components themselves are always
//! computed from the closed-form formulas.

pub mod attributes;
pub mod components;
pub mod score;

pub use attributes::{defaults, ParcelAttributes};
pub use components::RiskComponents;
pub use score::{feature_vector, RiskModel, RiskScore, RiskScorer};
