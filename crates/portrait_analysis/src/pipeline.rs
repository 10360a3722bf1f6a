use crate::classifier::{explain, FeatureVector, TemperamentClassifier};
use crate::personality::{estimate_traits, profile_notes};
use crate::recommend::derive_recommendations;
use crate::report::confidence_score;
use crate::stress::{select_stress, StressInput};
use portrait_core::{
    extract_geometry, interpret_emotions, Analysis, AnalysisError, FaceAnalysis, FaceSummary,
    GrayImage, PersonalityProfile,
};
use std::sync::Arc;

/// Runs the full inference chain for one photo.
///
/// Holds only the shared, read-only classifier, so one `Analyzer` can serve
/// any number of concurrent requests.
#[derive(Clone)]
pub struct Analyzer {
    classifier: Arc<dyn TemperamentClassifier>,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn TemperamentClassifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// `face` is the backend result (`None` = no face found). `image` is the
    /// decoded luma plane, used for stress when no face mesh is available.
    pub fn analyze(
        &self,
        face: Option<&FaceAnalysis>,
        image: Option<&GrayImage>,
    ) -> Result<Analysis, AnalysisError> {
        let face = face.ok_or(AnalysisError::NoFaceDetected)?;

        let emotion = interpret_emotions(&face.emotion);
        let geometry = face.landmarks.as_ref().and_then(extract_geometry);
        if geometry.is_none() {
            tracing::debug!("No usable face mesh, geometry stage skipped");
        }

        let stress = select_stress(&StressInput {
            landmarks: face.landmarks.as_ref(),
            image,
        });

        let traits = estimate_traits(&emotion, &stress, geometry.as_ref());
        let features = FeatureVector::new(&traits, geometry.as_ref(), &emotion, &stress);
        let classification = self.classifier.classify(&features);
        let recommendations = derive_recommendations(&traits, classification.category);
        let confidence = confidence_score(face.age, &face.gender, &emotion.dominant);

        tracing::info!(
            "Analysis: emotion={} valence={:.1} stress={:.0} temperament={} ({:.2}, {})",
            emotion.dominant,
            emotion.valence,
            stress.level,
            classification.category.key(),
            classification.confidence,
            self.classifier.name()
        );

        Ok(Analysis {
            face: FaceSummary {
                age: face.age,
                gender: face.gender.clone(),
                reported_emotion: face.dominant_emotion.clone(),
                blur_score: face.blur_score,
                frontal_score: face.frontal_score,
            },
            personality: PersonalityProfile {
                big_five: traits,
                temperament: classification.category,
                temperament_confidence: classification.confidence,
                geometry,
                explanation: explain(&classification, &features),
                notes: profile_notes(geometry.as_ref(), &stress),
            },
            emotion,
            stress,
            recommendations,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RuleClassifier;
    use crate::fixtures;
    use crate::personality::emotion_stage;
    use portrait_core::{EmotionDistribution, GeometryProfile, StressSource, TemperamentCategory};

    fn analyzer() -> Analyzer {
        Analyzer::new(Arc::new(RuleClassifier))
    }

    fn happy_face() -> FaceAnalysis {
        let mut face = FaceAnalysis::new(EmotionDistribution::from_pairs([
            ("happy", 80.0),
            ("sad", 5.0),
            ("neutral", 15.0),
        ]));
        face.age = 29;
        face.gender = "Woman".to_string();
        face.dominant_emotion = "happy".to_string();
        face
    }

    #[test]
    fn test_no_face_is_hard_stop() {
        let err = analyzer().analyze(None, None).unwrap_err();
        assert_eq!(err, AnalysisError::NoFaceDetected);
    }

    #[test]
    fn test_without_mesh_or_image() {
        let face = happy_face();
        let a = analyzer().analyze(Some(&face), None).unwrap();
        assert!(a.personality.geometry.is_none());
        assert!(!a.personality.geometry_measured());
        assert_eq!(a.stress.source, StressSource::Unavailable);
        // neutral stress and no geometry: only the emotion stage moves the vector
        assert_eq!(a.personality.big_five, emotion_stage(&a.emotion));
        assert_eq!(a.personality.big_five.extraversion, 65);
        assert_eq!(a.confidence, 90);
        assert!(!a.recommendations.roles.is_empty());
        assert!(!a.personality.explanation.is_empty());
    }

    #[test]
    fn test_with_reference_mesh() {
        let mut face = happy_face();
        face.landmarks = Some(fixtures::reference_face());
        let a = analyzer().analyze(Some(&face), None).unwrap();
        let g = a.personality.geometry.expect("measured");
        assert!((g.fwhr - 400.0 / 228.0).abs() < 1e-9);
        assert_eq!(a.stress.source, StressSource::Landmarks);
        assert_ne!(g, GeometryProfile::default());
    }

    #[test]
    fn test_image_used_when_no_mesh() {
        let face = happy_face();
        let image = GrayImage::new(8, 8, vec![100; 64]).unwrap();
        let a = analyzer().analyze(Some(&face), Some(&image)).unwrap();
        assert_eq!(a.stress.source, StressSource::ImageStatistics);
        assert_eq!(a.stress.level, 0.0);
    }

    #[test]
    fn test_empty_emotions_still_complete() {
        let face = FaceAnalysis::new(EmotionDistribution::new());
        let a = analyzer().analyze(Some(&face), None).unwrap();
        assert!(a.emotion.is_unknown());
        // age 0 and empty gender
        assert_eq!(a.confidence, 65);
        assert_eq!(a.face.age, 0);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let mut face = happy_face();
        face.landmarks = Some(fixtures::tense_face());
        let analyzer = analyzer();
        let a = analyzer.analyze(Some(&face), None).unwrap();
        let b = analyzer.analyze(Some(&face), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_classifier_verdict_flows_into_recommendations() {
        let face = happy_face();
        let a = analyzer().analyze(Some(&face), None).unwrap();
        // O55 C50 E65 A55 N40 with default geometry: no rule fires, harmonic fallback
        assert_eq!(a.personality.temperament, TemperamentCategory::Harmonic);
        assert!(a.recommendations.communication[0].contains("чесна"));
    }
}
