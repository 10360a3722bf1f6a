//! Big Five (OCEAN) estimation.
//!
//! Three stages run in strict order, each reading the clamped output of the
//! previous one:
//!
//! 1. `emotion_stage`: baseline plus valence and dominant-emotion rules
//! 2. `stress_stage`: neuroticism / conscientiousness nudges by stress level
//! 3. `geometry_stage`: one rule per facial ratio, skipped without a mesh
//!
//! All thresholds are exclusive: a value exactly on a threshold fires neither
//! branch of that rule.

use portrait_core::{
    EmotionCategory, EmotionProfile, GeometryProfile, StressEstimate, TraitDelta, TraitVector,
};

pub const BASELINE: TraitVector = TraitVector {
    openness: 55,
    conscientiousness: 50,
    extraversion: 50,
    agreeableness: 50,
    neuroticism: 50,
};

pub const POSITIVE_VALENCE_ABOVE: f64 = 60.0;
pub const NEGATIVE_VALENCE_BELOW: f64 = 40.0;
pub const HIGH_STRESS_ABOVE: f64 = 70.0;
pub const LOW_STRESS_BELOW: f64 = 30.0;

/// Stage 1: baseline adjusted by the emotional state.
pub fn emotion_stage(emotion: &EmotionProfile) -> TraitVector {
    let mut delta = TraitDelta::default();

    if emotion.valence > POSITIVE_VALENCE_ABOVE {
        delta += TraitDelta {
            neuroticism: -10,
            extraversion: 5,
            ..Default::default()
        };
    } else if emotion.valence < NEGATIVE_VALENCE_BELOW {
        delta += TraitDelta {
            neuroticism: 15,
            agreeableness: -5,
            ..Default::default()
        };
    }

    match emotion.dominant_category() {
        Some(EmotionCategory::Happy | EmotionCategory::Surprise) => {
            delta += TraitDelta {
                extraversion: 10,
                agreeableness: 5,
                ..Default::default()
            };
        }
        Some(EmotionCategory::Sad | EmotionCategory::Fear) => {
            delta += TraitDelta {
                neuroticism: 15,
                extraversion: -5,
                ..Default::default()
            };
        }
        Some(EmotionCategory::Angry | EmotionCategory::Disgust) => {
            delta += TraitDelta {
                neuroticism: 10,
                agreeableness: -10,
                ..Default::default()
            };
        }
        Some(EmotionCategory::Neutral) | None => {}
    }

    BASELINE.adjusted(delta)
}

/// Stage 2: stress correction.
pub fn stress_stage(traits: &TraitVector, stress: &StressEstimate) -> TraitVector {
    let delta = if stress.level > HIGH_STRESS_ABOVE {
        TraitDelta {
            neuroticism: 10,
            conscientiousness: -5,
            ..Default::default()
        }
    } else if stress.level < LOW_STRESS_BELOW {
        TraitDelta {
            neuroticism: -5,
            conscientiousness: 5,
            ..Default::default()
        }
    } else {
        TraitDelta::default()
    };
    traits.adjusted(delta)
}

/// Stage 3: geometry correction. A `None` profile leaves the vector untouched.
pub fn geometry_stage(traits: &TraitVector, geometry: Option<&GeometryProfile>) -> TraitVector {
    let Some(g) = geometry else {
        return *traits;
    };
    let mut delta = TraitDelta::default();

    if g.fwhr > 1.9 {
        delta += TraitDelta {
            extraversion: 8,
            conscientiousness: 5,
            agreeableness: -5,
            ..Default::default()
        };
    } else if g.fwhr < 1.6 {
        delta += TraitDelta {
            agreeableness: 5,
            extraversion: -5,
            ..Default::default()
        };
    }

    if g.symmetry > 0.9 {
        delta += TraitDelta {
            neuroticism: -10,
            ..Default::default()
        };
    } else if g.symmetry < 0.8 {
        delta += TraitDelta {
            neuroticism: 5,
            ..Default::default()
        };
    }

    if g.jaw > 0.6 {
        delta += TraitDelta {
            conscientiousness: 8,
            extraversion: 5,
            ..Default::default()
        };
    } else {
        delta += TraitDelta {
            agreeableness: 3,
            ..Default::default()
        };
    }

    if g.brow > 0.45 {
        delta += TraitDelta {
            openness: 5,
            agreeableness: 5,
            neuroticism: 3,
            ..Default::default()
        };
    } else {
        delta += TraitDelta {
            conscientiousness: 3,
            ..Default::default()
        };
    }

    if g.eyes < 0.25 {
        delta += TraitDelta {
            neuroticism: -5,
            conscientiousness: 5,
            ..Default::default()
        };
    } else {
        delta += TraitDelta {
            extraversion: 5,
            ..Default::default()
        };
    }

    traits.adjusted(delta)
}

/// Run all three stages.
pub fn estimate_traits(
    emotion: &EmotionProfile,
    stress: &StressEstimate,
    geometry: Option<&GeometryProfile>,
) -> TraitVector {
    let traits = emotion_stage(emotion);
    let traits = stress_stage(&traits, stress);
    geometry_stage(&traits, geometry)
}

/// Context notes attached to the personality profile.
pub fn profile_notes(geometry: Option<&GeometryProfile>, stress: &StressEstimate) -> Vec<String> {
    let mut notes = Vec::new();
    if geometry.is_some() {
        notes.push("Фізіогномічні ознаки враховані при формуванні профілю.".to_string());
    } else {
        notes.push(
            "Геометрію обличчя виміряти не вдалося; профіль побудовано без фізіогномічних ознак."
                .to_string(),
        );
    }
    if stress.level > HIGH_STRESS_ABOVE {
        notes.push("Високий рівень мікростресу тимчасово впливає на емоції.".to_string());
    }
    notes
}
