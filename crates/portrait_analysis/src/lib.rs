//! # Portrait analysis
//!
//! The inference chain that turns an interpreted face into a profile:
//!
//! 1. `stress`: microstress from face landmarks or image statistics
//! 2. `personality`: Big Five estimate in three clamped stages
//! 3. `classifier` / `forest`: temperament category from a 12-feature vector
//! 4. `recommend`: role, work style, risk and communication notes
//!
//! `pipeline::Analyzer` runs the chain; `report` renders the result as text.

pub mod classifier;
pub mod forest;
pub mod personality;
pub mod pipeline;
pub mod recommend;
pub mod report;
pub mod stress;

#[cfg(test)]
mod fixtures;

pub use classifier::{
    build_classifier, Classification, FeatureVector, RuleClassifier, TemperamentClassifier,
};
pub use forest::ForestClassifier;
pub use personality::estimate_traits;
pub use pipeline::Analyzer;
pub use recommend::derive_recommendations;
pub use report::render_report;
pub use stress::{
    select_stress, CoarseStressEstimator, LandmarkStressEstimator, StressEstimator, StressInput,
};
