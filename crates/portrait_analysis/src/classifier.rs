//! Temperament classification over a 12-dimensional feature vector.
//!
//! `TemperamentClassifier` is the strategy seam. `RuleClassifier` is an ordered
//! rule table; `ForestClassifier` (see `forest`) is a random forest trained on
//! synthetic profiles. Both are immutable after construction and are shared
//! between requests behind an `Arc`.

use crate::forest::ForestClassifier;
use portrait_core::config::{ClassifierConfig, ClassifierStrategy};
use portrait_core::{
    EmotionCategory, EmotionProfile, GeometryProfile, StressEstimate, TemperamentCategory,
    TraitVector,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const FEATURE_DIM: usize = 12;

/// Feature layout: five traits, five geometry ratios, signed valence, stress fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
    Fwhr,
    Symmetry,
    Jaw,
    Brow,
    Eyes,
    Valence,
    Stress,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_DIM] = [
        Feature::Openness,
        Feature::Conscientiousness,
        Feature::Extraversion,
        Feature::Agreeableness,
        Feature::Neuroticism,
        Feature::Fwhr,
        Feature::Symmetry,
        Feature::Jaw,
        Feature::Brow,
        Feature::Eyes,
        Feature::Valence,
        Feature::Stress,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_trait(&self) -> bool {
        self.index() < 5
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feature::Openness => "Відкритість",
            Feature::Conscientiousness => "Сумлінність",
            Feature::Extraversion => "Екстраверсія",
            Feature::Agreeableness => "Доброзичливість",
            Feature::Neuroticism => "Нейротизм",
            Feature::Fwhr => "fWHR",
            Feature::Symmetry => "Симетрія",
            Feature::Jaw => "Щелепа",
            Feature::Brow => "Брови",
            Feature::Eyes => "Очі",
            Feature::Valence => "Валентність",
            Feature::Stress => "Стрес",
        }
    }
}

/// Classifier input. Geometry falls back to the documented defaults when unmeasured.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIM],
    /// Dominant emotion key, consulted by the rule table only
    pub dominant: String,
}

impl FeatureVector {
    pub fn new(
        traits: &TraitVector,
        geometry: Option<&GeometryProfile>,
        emotion: &EmotionProfile,
        stress: &StressEstimate,
    ) -> Self {
        let g = geometry.copied().unwrap_or_default();
        let [o, c, e, a, n] = traits.as_array();
        Self {
            values: [
                o as f64,
                c as f64,
                e as f64,
                a as f64,
                n as f64,
                g.fwhr,
                g.symmetry,
                g.jaw,
                g.brow,
                g.eyes,
                emotion.signed_valence(),
                (stress.level / 100.0).clamp(0.0, 1.0),
            ],
            dominant: emotion.dominant.clone(),
        }
    }

    pub fn from_values(values: [f64; FEATURE_DIM], dominant: impl Into<String>) -> Self {
        Self { values, dominant: dominant.into() }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn values(&self) -> &[f64; FEATURE_DIM] {
        &self.values
    }

    fn dominant_is(&self, categories: &[EmotionCategory]) -> bool {
        EmotionCategory::from_key(&self.dominant).is_some_and(|c| categories.contains(&c))
    }
}

/// A classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: TemperamentCategory,
    /// 0..1
    pub confidence: f64,
}

pub trait TemperamentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deterministic: equal inputs always give equal verdicts.
    fn classify(&self, features: &FeatureVector) -> Classification;
}

// ============================================================================
// Category training profiles
// ============================================================================

/// Per-feature `[lo, hi)` ranges describing a typical member of a category.
/// Trait ranges are integral.
pub struct CategoryProfile {
    pub category: TemperamentCategory,
    pub ranges: [(f64, f64); FEATURE_DIM],
}

pub static CATEGORY_PROFILES: [CategoryProfile; 7] = [
    CategoryProfile {
        category: TemperamentCategory::Excitable,
        ranges: [
            (40.0, 65.0), (45.0, 60.0), (65.0, 90.0), (20.0, 40.0), (60.0, 90.0),
            (1.90, 2.20), (0.80, 0.92), (0.55, 0.80), (0.40, 0.55), (0.30, 0.70),
            (-0.2, 0.2), (0.4, 0.9),
        ],
    },
    CategoryProfile {
        category: TemperamentCategory::Anankast,
        ranges: [
            (45.0, 65.0), (70.0, 95.0), (30.0, 55.0), (55.0, 75.0), (10.0, 40.0),
            (1.55, 1.85), (0.92, 0.98), (0.40, 0.60), (0.30, 0.45), (0.15, 0.50),
            (0.0, 0.4), (0.0, 0.4),
        ],
    },
    CategoryProfile {
        category: TemperamentCategory::Sensitive,
        ranges: [
            (55.0, 75.0), (35.0, 55.0), (20.0, 45.0), (65.0, 90.0), (60.0, 95.0),
            (1.45, 1.75), (0.75, 0.88), (0.30, 0.50), (0.40, 0.60), (0.30, 0.70),
            (-0.6, -0.1), (0.2, 0.6),
        ],
    },
    CategoryProfile {
        category: TemperamentCategory::Epileptoid,
        ranges: [
            (35.0, 60.0), (60.0, 85.0), (55.0, 80.0), (20.0, 45.0), (50.0, 75.0),
            (1.80, 2.10), (0.85, 0.94), (0.60, 0.90), (0.25, 0.45), (0.20, 0.60),
            (-0.3, 0.3), (0.3, 0.9),
        ],
    },
    CategoryProfile {
        category: TemperamentCategory::Hysteroid,
        ranges: [
            (60.0, 90.0), (35.0, 55.0), (55.0, 85.0), (45.0, 70.0), (35.0, 60.0),
            (1.55, 1.85), (0.85, 0.95), (0.45, 0.70), (0.50, 0.80), (0.30, 0.80),
            (0.1, 0.8), (0.1, 0.6),
        ],
    },
    CategoryProfile {
        category: TemperamentCategory::Harmonic,
        ranges: [
            (45.0, 60.0), (45.0, 60.0), (45.0, 60.0), (55.0, 70.0), (30.0, 50.0),
            (1.60, 1.85), (0.88, 0.98), (0.45, 0.65), (0.35, 0.55), (0.25, 0.55),
            (-0.1, 0.4), (0.1, 0.4),
        ],
    },
    CategoryProfile {
        category: TemperamentCategory::Mixed,
        ranges: [
            (40.0, 70.0), (30.0, 70.0), (30.0, 70.0), (30.0, 70.0), (30.0, 70.0),
            (1.55, 1.95), (0.80, 0.95), (0.40, 0.70), (0.25, 0.60), (0.20, 0.70),
            (-0.3, 0.5), (0.1, 0.7),
        ],
    },
];

pub fn category_profile(category: TemperamentCategory) -> &'static CategoryProfile {
    &CATEGORY_PROFILES[category.index()]
}

impl CategoryProfile {
    /// Midpoint of every range.
    pub fn center(&self) -> [f64; FEATURE_DIM] {
        let mut out = [0.0; FEATURE_DIM];
        for (slot, (lo, hi)) in out.iter_mut().zip(self.ranges.iter()) {
            *slot = (lo + hi) / 2.0;
        }
        out
    }

    pub fn contains(&self, feature: Feature, value: f64) -> bool {
        let (lo, hi) = self.ranges[feature.index()];
        value >= lo && value <= hi
    }
}

/// Human-readable reasons for a verdict: the features that sit inside the
/// chosen category's typical ranges.
pub fn explain(classification: &Classification, features: &FeatureVector) -> Vec<String> {
    const MAX_REASONS: usize = 4;
    let mut lines = Vec::new();

    if classification.category == TemperamentCategory::Mixed {
        lines.push(
            "Ознаки не утворюють чіткого патерну жодного радикалу, тому обрано змішаний тип."
                .to_string(),
        );
    } else {
        let profile = category_profile(classification.category);
        for feature in Feature::ALL {
            if lines.len() == MAX_REASONS {
                break;
            }
            let value = features.get(feature);
            if !profile.contains(feature, value) {
                continue;
            }
            let (lo, hi) = profile.ranges[feature.index()];
            lines.push(if feature.is_trait() {
                format!("{}: {:.0} (типово {:.0}..{:.0})", feature.label(), value, lo, hi)
            } else {
                format!("{}: {:.2} (типово {:.2}..{:.2})", feature.label(), value, lo, hi)
            });
        }
        if lines.is_empty() {
            lines.push(
                "Радикал визначено за сукупністю ознак без окремої домінуючої риси.".to_string(),
            );
        }
    }

    lines.push(format!(
        "Впевненість класифікатора: {:.0}%",
        classification.confidence.clamp(0.0, 1.0) * 100.0
    ));
    lines
}

// ============================================================================
// Rule table
// ============================================================================

type Predicate = fn(&FeatureVector) -> bool;

fn excitable(f: &FeatureVector) -> bool {
    f.get(Feature::Extraversion) >= 65.0
        && f.get(Feature::Conscientiousness) < 60.0
        && f.get(Feature::Agreeableness) < 40.0
        && f.get(Feature::Neuroticism) >= 60.0
}

fn anankast(f: &FeatureVector) -> bool {
    f.get(Feature::Conscientiousness) >= 70.0 && f.get(Feature::Neuroticism) < 40.0
}

fn sensitive(f: &FeatureVector) -> bool {
    f.get(Feature::Agreeableness) >= 65.0
        && f.get(Feature::Neuroticism) >= 60.0
        && (f.get(Feature::Extraversion) < 45.0
            || f.dominant_is(&[EmotionCategory::Sad, EmotionCategory::Fear]))
}

fn epileptoid(f: &FeatureVector) -> bool {
    f.get(Feature::Conscientiousness) >= 60.0
        && f.get(Feature::Agreeableness) < 45.0
        && f.get(Feature::Jaw) > 0.6
}

fn hysteroid(f: &FeatureVector) -> bool {
    f.get(Feature::Openness) >= 60.0
        && f.get(Feature::Extraversion) >= 55.0
        && (f.get(Feature::Valence) > 0.1
            || f.dominant_is(&[EmotionCategory::Happy, EmotionCategory::Surprise]))
}

/// First matching rule wins.
const RULES: [(TemperamentCategory, Predicate); 5] = [
    (TemperamentCategory::Excitable, excitable),
    (TemperamentCategory::Anankast, anankast),
    (TemperamentCategory::Sensitive, sensitive),
    (TemperamentCategory::Epileptoid, epileptoid),
    (TemperamentCategory::Hysteroid, hysteroid),
];

/// Ordered threshold rules with a harmonic / mixed fallback.
/// Rule verdicts carry full confidence.
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier;

impl TemperamentClassifier for RuleClassifier {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn classify(&self, features: &FeatureVector) -> Classification {
        let category = RULES
            .iter()
            .find(|(_, predicate)| predicate(features))
            .map(|(category, _)| *category)
            .unwrap_or_else(|| {
                if features.get(Feature::Neuroticism) < 50.0
                    && features.get(Feature::Agreeableness) >= 55.0
                {
                    TemperamentCategory::Harmonic
                } else {
                    TemperamentCategory::Mixed
                }
            });
        Classification { category, confidence: 1.0 }
    }
}

/// Build the configured classifier. Training the forest is CPU-bound; call
/// this from a blocking context.
pub fn build_classifier(config: &ClassifierConfig) -> Arc<dyn TemperamentClassifier> {
    match config.strategy {
        ClassifierStrategy::Rules => {
            tracing::info!("Using rule-based temperament classifier");
            Arc::new(RuleClassifier)
        }
        ClassifierStrategy::Forest => {
            let started = std::time::Instant::now();
            let forest = ForestClassifier::train(config);
            tracing::info!(
                "Trained temperament forest: {} trees in {:?}",
                forest.tree_count(),
                started.elapsed()
            );
            Arc::new(forest)
        }
    }
}
