//! Typed records passed between pipeline stages and handed to storage and
//! report rendering. All of them are plain data and serialize to JSON.

use crate::emotion::EmotionProfile;
use crate::geometry::GeometryProfile;
use crate::temperament::TemperamentCategory;
use serde::{Deserialize, Serialize};

/// Big Five (OCEAN) scores, each an integer in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitVector {
    pub openness: u8,
    pub conscientiousness: u8,
    pub extraversion: u8,
    pub agreeableness: u8,
    pub neuroticism: u8,
}

/// Signed per-trait increments applied by one estimation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraitDelta {
    pub openness: i32,
    pub conscientiousness: i32,
    pub extraversion: i32,
    pub agreeableness: i32,
    pub neuroticism: i32,
}

impl TraitDelta {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl std::ops::AddAssign for TraitDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.openness += rhs.openness;
        self.conscientiousness += rhs.conscientiousness;
        self.extraversion += rhs.extraversion;
        self.agreeableness += rhs.agreeableness;
        self.neuroticism += rhs.neuroticism;
    }
}

fn clamp_score(v: i32) -> u8 {
    v.clamp(0, 100) as u8
}

impl TraitVector {
    pub fn new(
        openness: i32,
        conscientiousness: i32,
        extraversion: i32,
        agreeableness: i32,
        neuroticism: i32,
    ) -> Self {
        Self {
            openness: clamp_score(openness),
            conscientiousness: clamp_score(conscientiousness),
            extraversion: clamp_score(extraversion),
            agreeableness: clamp_score(agreeableness),
            neuroticism: clamp_score(neuroticism),
        }
    }

    /// Apply a delta and clamp every dimension back into [0, 100].
    pub fn adjusted(&self, delta: TraitDelta) -> Self {
        Self::new(
            self.openness as i32 + delta.openness,
            self.conscientiousness as i32 + delta.conscientiousness,
            self.extraversion as i32 + delta.extraversion,
            self.agreeableness as i32 + delta.agreeableness,
            self.neuroticism as i32 + delta.neuroticism,
        )
    }

    /// Scores in O, C, E, A, N order.
    pub fn as_array(&self) -> [u8; 5] {
        [
            self.openness,
            self.conscientiousness,
            self.extraversion,
            self.agreeableness,
            self.neuroticism,
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, u8)> {
        Trait::ALL.into_iter().zip(self.as_array())
    }
}

/// The five dimensions, in canonical O, C, E, A, N order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Trait {
    pub const ALL: [Trait; 5] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Trait::Openness => "Openness",
            Trait::Conscientiousness => "Conscientious",
            Trait::Extraversion => "Extraversion",
            Trait::Agreeableness => "Agreeableness",
            Trait::Neuroticism => "Neuroticism",
        }
    }

    pub fn local_name(&self) -> &'static str {
        match self {
            Trait::Openness => "Відкритість",
            Trait::Conscientiousness => "Сумлінність",
            Trait::Extraversion => "Екстраверсія",
            Trait::Agreeableness => "Доброзичливість",
            Trait::Neuroticism => "Нейротизм",
        }
    }
}

/// Three-band stress label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLabel {
    Low,
    Medium,
    High,
}

impl StressLabel {
    pub const MEDIUM_ABOVE: f64 = 35.0;
    pub const HIGH_ABOVE: f64 = 65.0;

    pub fn from_level(level: f64) -> Self {
        if level > Self::HIGH_ABOVE {
            StressLabel::High
        } else if level > Self::MEDIUM_ABOVE {
            StressLabel::Medium
        } else {
            StressLabel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StressLabel::Low => "низький",
            StressLabel::Medium => "середній",
            StressLabel::High => "високий",
        }
    }
}

/// Which strategy produced a `StressEstimate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressSource {
    Landmarks,
    ImageStatistics,
    Unavailable,
}

/// Microstress estimate with the factors that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressEstimate {
    /// 0..100
    pub level: f64,
    pub label: StressLabel,
    /// Human-readable contributing factors, never empty
    pub factors: Vec<String>,
    pub source: StressSource,
}

impl StressEstimate {
    pub fn new(level: f64, factors: Vec<String>, source: StressSource) -> Self {
        let level = if level.is_finite() { level.clamp(0.0, 100.0) } else { 50.0 };
        let factors = if factors.is_empty() {
            vec!["Ознак напруги не зафіксовано.".to_string()]
        } else {
            factors
        };
        Self {
            level,
            label: StressLabel::from_level(level),
            factors,
            source,
        }
    }

    /// Neutral estimate used when neither landmarks nor pixels are available.
    pub fn unavailable() -> Self {
        Self::new(
            50.0,
            vec!["Недостатньо даних для оцінки напруги.".to_string()],
            StressSource::Unavailable,
        )
    }
}

/// Work-related recommendations. Each list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub roles: Vec<String>,
    pub work_style: Vec<String>,
    pub risks: Vec<String>,
    pub communication: Vec<String>,
}

/// Face attributes reported by the backend, kept for the report and history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceSummary {
    pub age: u32,
    pub gender: String,
    pub reported_emotion: String,
    #[serde(default)]
    pub blur_score: Option<f64>,
    #[serde(default)]
    pub frontal_score: Option<f64>,
}

/// Trait estimate plus temperament classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub big_five: TraitVector,
    pub temperament: TemperamentCategory,
    /// Classifier confidence for the chosen category, 0..1
    pub temperament_confidence: f64,
    /// Measured geometry; `None` when no face mesh was available
    pub geometry: Option<GeometryProfile>,
    /// Which features supported the chosen category
    #[serde(default)]
    pub explanation: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl PersonalityProfile {
    pub fn geometry_measured(&self) -> bool {
        self.geometry.is_some()
    }
}

/// Complete result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub face: FaceSummary,
    pub emotion: EmotionProfile,
    pub stress: StressEstimate,
    pub personality: PersonalityProfile,
    pub recommendations: RecommendationSet,
    /// Reliability estimate of the whole profile, percent
    pub confidence: u8,
}
