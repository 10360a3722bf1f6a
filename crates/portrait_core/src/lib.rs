pub mod config;
pub mod emotion;
pub mod error;
pub mod face;
pub mod geometry;
pub mod profile;
pub mod temperament;

pub use config::PortraitConfig;
pub use emotion::{
    interpret_emotions, EmotionCategory, EmotionDistribution, EmotionProfile, Stability,
};
pub use error::AnalysisError;
pub use face::{CoordinateSpace, FaceAnalysis, GrayImage, Landmarks, Point};
pub use geometry::{extract_geometry, FaceMesh, GeometryProfile, LandmarkContract};
pub use profile::{
    Analysis, FaceSummary, PersonalityProfile, RecommendationSet, StressEstimate, StressLabel,
    StressSource, Trait, TraitDelta, TraitVector,
};
pub use temperament::{TemperamentCategory, TemperamentInfo};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External face/emotion model.
#[async_trait]
pub trait FaceBackend: Send + Sync {
    /// `Ok(None)` means the image contains no usable face.
    async fn detect(&self, image: &[u8]) -> anyhow::Result<Option<FaceAnalysis>>;
}

/// A persisted analysis as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: i64,
    pub user_id: i64,
    pub image_path: String,
    pub analysis: Analysis,
    pub full_report: String,
    pub created_at: DateTime<Utc>,
}

/// Per-user report history.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist one analysis and return its row id.
    async fn save_report(
        &self,
        user_id: i64,
        image_path: &str,
        analysis: &Analysis,
        report: &str,
    ) -> anyhow::Result<i64>;
    /// All reports of a user, newest first.
    async fn user_reports(&self, user_id: i64) -> anyhow::Result<Vec<StoredReport>>;
}
