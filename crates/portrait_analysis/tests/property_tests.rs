//! Property-based tests for the inference chain.
//!
//! Verifies the clamp invariant after every trait stage, that recommendation
//! lists are never empty, that stress estimates stay on their scale, and that
//! both classifier strategies are deterministic.

use portrait_analysis::classifier::FEATURE_DIM;
use portrait_analysis::personality::{emotion_stage, geometry_stage, stress_stage};
use portrait_analysis::stress::{CoarseStressEstimator, LandmarkStressEstimator, TensionMetrics};
use portrait_analysis::{
    derive_recommendations, estimate_traits, Analyzer, FeatureVector, ForestClassifier,
    RuleClassifier, StressEstimator, StressInput, TemperamentClassifier,
};
use portrait_core::config::ClassifierConfig;
use portrait_core::{
    interpret_emotions, EmotionCategory, EmotionDistribution, EmotionProfile, FaceAnalysis,
    GeometryProfile, GrayImage, StressEstimate, StressSource, TemperamentCategory, TraitVector,
};
use proptest::prelude::*;
use std::sync::{Arc, OnceLock};

// ============================================================================
// Strategies
// ============================================================================

fn arb_emotion() -> impl Strategy<Value = EmotionProfile> {
    prop::collection::vec(
        (prop::sample::select(EmotionCategory::ALL.to_vec()), 0.0f64..=100.0),
        0..7,
    )
    .prop_map(|pairs| {
        interpret_emotions(&EmotionDistribution::from_pairs(
            pairs.into_iter().map(|(c, v)| (c.as_str(), v)),
        ))
    })
}

fn arb_stress() -> impl Strategy<Value = StressEstimate> {
    (0.0f64..=100.0)
        .prop_map(|level| StressEstimate::new(level, vec!["x".into()], StressSource::Landmarks))
}

fn arb_geometry() -> impl Strategy<Value = Option<GeometryProfile>> {
    prop::option::of(
        (1.2f64..=2.6, 0.5f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
            |(fwhr, symmetry, jaw, brow, eyes)| GeometryProfile { fwhr, symmetry, jaw, brow, eyes },
        ),
    )
}

fn arb_traits() -> impl Strategy<Value = TraitVector> {
    (0i32..=100, 0i32..=100, 0i32..=100, 0i32..=100, 0i32..=100)
        .prop_map(|(o, c, e, a, n)| TraitVector::new(o, c, e, a, n))
}

fn arb_category() -> impl Strategy<Value = TemperamentCategory> {
    prop::sample::select(TemperamentCategory::ALL.to_vec())
}

fn arb_features() -> impl Strategy<Value = FeatureVector> {
    let dominant = prop::sample::select(vec!["happy", "sad", "neutral", "unknown"]);
    (prop::array::uniform12(0.0f64..=100.0), dominant).prop_map(|(mut values, dominant)| {
        // scale the non-trait columns back into their natural ranges
        for v in values.iter_mut().skip(5) {
            *v /= 100.0;
        }
        values[5] = 1.2 + values[5] * 1.4;
        FeatureVector::from_values(values, dominant)
    })
}

fn shared_forest() -> &'static ForestClassifier {
    static FOREST: OnceLock<ForestClassifier> = OnceLock::new();
    FOREST.get_or_init(|| {
        ForestClassifier::train(&ClassifierConfig {
            trees: 40,
            ..Default::default()
        })
    })
}

fn assert_bounded(t: &TraitVector) -> Result<(), TestCaseError> {
    for score in t.as_array() {
        prop_assert!(score <= 100, "score {} out of range", score);
    }
    Ok(())
}

// ============================================================================
// Trait estimation
// ============================================================================

proptest! {
    /// **Core invariant**: every stage output is clamped to 0..=100.
    #[test]
    fn traits_clamped_after_every_stage(
        emotion in arb_emotion(),
        stress in arb_stress(),
        geometry in arb_geometry(),
    ) {
        let t1 = emotion_stage(&emotion);
        assert_bounded(&t1)?;
        let t2 = stress_stage(&t1, &stress);
        assert_bounded(&t2)?;
        let t3 = geometry_stage(&t2, geometry.as_ref());
        assert_bounded(&t3)?;
        prop_assert_eq!(t3, estimate_traits(&emotion, &stress, geometry.as_ref()));
    }

    /// Skipping geometry leaves the stress-stage output untouched.
    #[test]
    fn missing_geometry_is_noop(traits in arb_traits()) {
        prop_assert_eq!(geometry_stage(&traits, None), traits);
    }
}

// ============================================================================
// Recommendations
// ============================================================================

proptest! {
    /// No list is ever empty, whatever the traits and category.
    #[test]
    fn recommendations_never_empty(traits in arb_traits(), category in arb_category()) {
        let r = derive_recommendations(&traits, category);
        prop_assert!(!r.roles.is_empty());
        prop_assert_eq!(r.work_style.len(), 2);
        prop_assert!(!r.risks.is_empty());
        prop_assert_eq!(r.communication.len(), 1);
    }
}

// ============================================================================
// Stress
// ============================================================================

proptest! {
    /// Landmark scoring stays on 0..100 and always explains itself.
    #[test]
    fn landmark_stress_bounded(
        eyes in prop::option::of(0.0f64..1.0),
        brow in prop::option::of(0.0f64..0.5),
        lips in prop::option::of(0.0f64..1.0),
    ) {
        let s = LandmarkStressEstimator::default().score(&TensionMetrics {
            eye_aperture: eyes,
            brow_height: brow,
            lip_ratio: lips,
        });
        prop_assert!((0.0..=100.0).contains(&s.level));
        prop_assert!(!s.factors.is_empty());
    }

    /// Image statistics stay on 0..100 for any raster.
    #[test]
    fn coarse_stress_bounded(w in 1u32..12, h in 1u32..12, seed in any::<u64>()) {
        let pixels = (0..w * h)
            .map(|i| {
                let mixed = seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add((i as u64).wrapping_mul(1442695040888963407));
                (mixed >> 56) as u8
            })
            .collect();
        let image = GrayImage::new(w, h, pixels).unwrap();
        let s = CoarseStressEstimator
            .estimate(&StressInput { landmarks: None, image: Some(&image) })
            .unwrap();
        prop_assert!((0.0..=100.0).contains(&s.level));
        prop_assert_eq!(s.factors.len(), 2);
    }
}

// ============================================================================
// Classifiers
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Identical inputs give identical verdicts.
    #[test]
    fn classifiers_deterministic(features in arb_features()) {
        let rules = RuleClassifier;
        prop_assert_eq!(rules.classify(&features), rules.classify(&features));

        let forest = shared_forest();
        let a = forest.classify(&features);
        let b = forest.classify(&features.clone());
        prop_assert_eq!(a, b);
        prop_assert!((0.0..=1.0).contains(&a.confidence));
        if a.confidence < 0.45 {
            prop_assert_eq!(a.category, TemperamentCategory::Mixed);
        }
    }

    /// The analyzer never fails once a face is present.
    #[test]
    fn analyzer_total_for_present_face(
        emotion_pairs in prop::collection::vec(("[a-z]{3,7}", 0.0f64..50.0), 0..6),
    ) {
        let face = FaceAnalysis::new(EmotionDistribution::from_pairs(emotion_pairs));
        let analyzer = Analyzer::new(Arc::new(RuleClassifier));
        let analysis = analyzer.analyze(Some(&face), None);
        prop_assert!(analysis.is_ok());
        let analysis = analysis.unwrap();
        prop_assert!((40..=97).contains(&analysis.confidence));
    }
}

#[test]
fn feature_dim_matches_layout() {
    assert_eq!(FEATURE_DIM, 12);
}
