//! Property-based tests for the emotion interpreter and geometry extractor.
//!
//! Verifies that interpreted profiles stay within their documented ranges for
//! arbitrary score maps, that the interpreter is scale agnostic, and that
//! geometry extraction never leaves the clamp ranges for arbitrary meshes.

use portrait_core::geometry::{FWHR_RANGE, SYMMETRY_RANGE};
use portrait_core::{
    extract_geometry, interpret_emotions, CoordinateSpace, EmotionCategory, EmotionDistribution,
    EmotionProfile, LandmarkContract, Landmarks, Point, Stability, TraitDelta, TraitVector,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(EmotionCategory::ALL.to_vec())
            .prop_map(|c| c.as_str().to_string()),
        1 => "[a-z]{3,8}",
    ]
}

fn arb_distribution() -> impl Strategy<Value = EmotionDistribution> {
    prop::collection::vec((arb_key(), 0.0f64..=100.0), 0..10)
        .prop_map(EmotionDistribution::from_pairs)
}

fn arb_huge_distribution() -> impl Strategy<Value = EmotionDistribution> {
    prop::collection::vec((arb_key(), 0.0f64..=f64::MAX), 1..10)
        .prop_map(EmotionDistribution::from_pairs)
}

fn arb_mesh() -> impl Strategy<Value = Landmarks> {
    prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), LandmarkContract::MIN_POINTS).prop_map(
        |pts| Landmarks {
            points: pts.into_iter().map(|(x, y)| Point::new(x, y)).collect(),
            space: CoordinateSpace::Normalized,
            image_width: 640,
            image_height: 480,
        },
    )
}

fn arb_delta() -> impl Strategy<Value = TraitDelta> {
    (-200i32..=200, -200i32..=200, -200i32..=200, -200i32..=200, -200i32..=200).prop_map(
        |(o, c, e, a, n)| TraitDelta {
            openness: o,
            conscientiousness: c,
            extraversion: e,
            agreeableness: a,
            neuroticism: n,
        },
    )
}

// ============================================================================
// Emotion Interpreter Properties
// ============================================================================

proptest! {
    /// Valence and intensity are always on 0..100, whatever the input.
    #[test]
    fn emotion_profile_bounded(dist in arb_distribution()) {
        let profile = interpret_emotions(&dist);
        prop_assert!((0.0..=100.0).contains(&profile.valence),
            "valence {} out of range", profile.valence);
        prop_assert!((0.0..=100.0).contains(&profile.intensity),
            "intensity {} out of range", profile.intensity);
    }

    /// Normalized fractions sum to 1 for any input with positive mass.
    #[test]
    fn normalized_sums_to_one(dist in arb_distribution()) {
        let profile = interpret_emotions(&dist);
        if dist.total() > 0.0 {
            let sum: f64 = profile.normalized.values().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "sum = {}", sum);
            prop_assert!(profile.stability != Stability::Unknown);
        } else {
            prop_assert!(profile.is_unknown());
            prop_assert_eq!(profile.valence, 50.0);
        }
    }

    /// Multiplying every score by a positive constant changes nothing.
    #[test]
    fn interpreter_is_scale_agnostic(dist in arb_distribution(), factor in 0.01f64..1000.0) {
        let scaled =
            EmotionDistribution::from_pairs(dist.iter().map(|(k, v)| (k.to_string(), v * factor)));
        let a = interpret_emotions(&dist);
        let b = interpret_emotions(&scaled);
        prop_assert_eq!(&a.dominant, &b.dominant);
        prop_assert!((a.valence - b.valence).abs() < 1e-6);
        prop_assert!((a.intensity - b.intensity).abs() < 1e-6);
    }

    /// The dominant key holds the largest fraction.
    #[test]
    fn dominant_is_argmax(dist in arb_distribution()) {
        let profile = interpret_emotions(&dist);
        let best = profile.normalized.values().copied().reduce(f64::max);
        if let Some(best) = best {
            let dominant = profile.normalized.get(&profile.dominant).copied().unwrap_or(-1.0);
            prop_assert_eq!(dominant, best);
        }
    }

    /// Profiles survive a JSON round trip unchanged.
    #[test]
    fn emotion_profile_json_roundtrip(dist in arb_distribution()) {
        let profile = interpret_emotions(&dist);
        let json = serde_json::to_string(&profile).unwrap();
        let back: EmotionProfile = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(profile, back);
    }

    /// Scores anywhere up to `f64::MAX` still normalize and serialize.
    #[test]
    fn huge_scores_normalize_and_roundtrip(dist in arb_huge_distribution()) {
        let profile = interpret_emotions(&dist);
        prop_assert!(profile.valence.is_finite() && profile.intensity.is_finite());
        if dist.iter().any(|(_, v)| v > 0.0) {
            let sum: f64 = profile.normalized.values().sum();
            prop_assert!((sum - 1.0).abs() < 1e-6, "sum = {}", sum);
        }
        let json = serde_json::to_string(&profile).unwrap();
        let back: EmotionProfile = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(profile, back);
    }
}

// ============================================================================
// Geometry Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any full mesh yields ratios inside their clamp ranges.
    #[test]
    fn geometry_always_clamped(mesh in arb_mesh()) {
        let g = extract_geometry(&mesh).expect("full mesh is measurable");
        prop_assert!((FWHR_RANGE.0..=FWHR_RANGE.1).contains(&g.fwhr), "fwhr {}", g.fwhr);
        prop_assert!(
            (SYMMETRY_RANGE.0..=SYMMETRY_RANGE.1).contains(&g.symmetry),
            "symmetry {}",
            g.symmetry
        );
        prop_assert!((0.0..=1.0).contains(&g.jaw), "jaw {}", g.jaw);
        prop_assert!((0.0..=1.0).contains(&g.brow), "brow {}", g.brow);
        prop_assert!((0.0..=1.0).contains(&g.eyes), "eyes {}", g.eyes);
    }

    /// Truncated meshes are never measured.
    #[test]
    fn truncated_mesh_unmeasured(mesh in arb_mesh(), keep in 0usize..LandmarkContract::MIN_POINTS) {
        let mut mesh = mesh;
        mesh.points.truncate(keep);
        prop_assert!(extract_geometry(&mesh).is_none());
    }
}

// ============================================================================
// Trait Vector Properties
// ============================================================================

proptest! {
    /// Any sequence of deltas keeps every score within 0..=100.
    #[test]
    fn trait_vector_stays_bounded(deltas in prop::collection::vec(arb_delta(), 0..6)) {
        let mut v = TraitVector::new(55, 50, 50, 50, 50);
        for d in deltas {
            v = v.adjusted(d);
            for score in v.as_array() {
                prop_assert!(score <= 100);
            }
        }
    }
}
