//! Microstress estimation.
//!
//! Two interchangeable strategies share the 0..100 level scale and the
//! low / medium / high banding of `StressLabel`:
//!
//! - `LandmarkStressEstimator` reads eye aperture, brow height and lip
//!   compression off a full face mesh.
//! - `CoarseStressEstimator` falls back to global image statistics
//!   (grayscale contrast and Laplacian variance) when no mesh exists.
//!
//! `select_stress` picks the best strategy the available inputs allow.

use portrait_core::{FaceMesh, GrayImage, Landmarks, StressEstimate, StressSource};

/// Inputs a stress strategy may draw on. Either may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct StressInput<'a> {
    pub landmarks: Option<&'a Landmarks>,
    pub image: Option<&'a GrayImage>,
}

pub trait StressEstimator: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when this strategy lacks the input it needs.
    fn estimate(&self, input: &StressInput<'_>) -> Option<StressEstimate>;
}

// ============================================================================
// Landmark strategy
// ============================================================================

/// Baseline level before any rule fires.
pub const BASELINE_LEVEL: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct LandmarkStressEstimator {
    /// Eyelid gap / eye width below which eyes count as narrowed
    pub narrow_eyes_below: f64,
    pub wide_eyes_above: f64,
    /// Brow-to-eye distance / face height below which brows count as lowered
    pub low_brows_below: f64,
    pub raised_brows_above: f64,
    /// Inner lip gap / mouth width below which lips count as compressed
    pub compressed_lips_below: f64,
    pub parted_lips_above: f64,
}

impl Default for LandmarkStressEstimator {
    fn default() -> Self {
        Self {
            narrow_eyes_below: 0.18,
            wide_eyes_above: 0.32,
            low_brows_below: 0.08,
            raised_brows_above: 0.12,
            compressed_lips_below: 0.06,
            parted_lips_above: 0.25,
        }
    }
}

/// Facial measurements the landmark strategy reasons over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensionMetrics {
    pub eye_aperture: Option<f64>,
    pub brow_height: Option<f64>,
    pub lip_ratio: Option<f64>,
}

impl TensionMetrics {
    pub fn from_mesh(mesh: &FaceMesh) -> Self {
        Self {
            eye_aperture: safe_ratio(mesh.eyelid_gap(), mesh.eye_width()),
            brow_height: safe_ratio(mesh.brow_eye_distance(), mesh.face_height()),
            lip_ratio: safe_ratio(mesh.mouth_height(), mesh.mouth_width()),
        }
    }

    /// True when none of the measurements could be taken.
    pub fn is_unmeasured(&self) -> bool {
        self.eye_aperture.is_none() && self.brow_height.is_none() && self.lip_ratio.is_none()
    }
}

fn safe_ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0 && num.is_finite() && den.is_finite()).then(|| num / den)
}

impl LandmarkStressEstimator {
    /// Score a set of measurements. Metrics that could not be measured are skipped.
    pub fn score(&self, metrics: &TensionMetrics) -> StressEstimate {
        let mut level = BASELINE_LEVEL;
        let mut factors = Vec::new();
        let mut tense = false;

        if let Some(eyes) = metrics.eye_aperture {
            if eyes < self.narrow_eyes_below {
                level += 15.0;
                tense = true;
                factors.push(format!("Примружені очі (розкриття {:.2}).", eyes));
            } else if eyes > self.wide_eyes_above {
                level -= 10.0;
                factors.push(format!("Відкритий, розслаблений погляд (розкриття {:.2}).", eyes));
            }
        }

        if let Some(brow) = metrics.brow_height {
            if brow < self.low_brows_below {
                level += 15.0;
                tense = true;
                factors.push(format!("Опущені, зведені брови (висота {:.3}).", brow));
            } else if brow > self.raised_brows_above {
                level -= 10.0;
                factors.push(format!(
                    "Брови в розслабленому піднятому положенні (висота {:.3}).",
                    brow
                ));
            }
        }

        if let Some(lips) = metrics.lip_ratio {
            if lips < self.compressed_lips_below {
                level += 10.0;
                tense = true;
                factors.push(format!("Стиснуті губи (співвідношення {:.2}).", lips));
            } else if lips > self.parted_lips_above {
                level -= 5.0;
                factors.push(format!(
                    "Розслаблені, злегка розкриті губи (співвідношення {:.2}).",
                    lips
                ));
            }
        }

        if !tense {
            factors.push("Мінімальні ознаки напруги в міміці.".to_string());
        }

        StressEstimate::new(level, factors, StressSource::Landmarks)
    }
}

impl StressEstimator for LandmarkStressEstimator {
    fn name(&self) -> &'static str {
        "landmarks"
    }

    fn estimate(&self, input: &StressInput<'_>) -> Option<StressEstimate> {
        let mesh = FaceMesh::from_landmarks(input.landmarks?)?;
        let metrics = TensionMetrics::from_mesh(&mesh);
        if metrics.is_unmeasured() {
            return None;
        }
        Some(self.score(&metrics))
    }
}

// ============================================================================
// Image statistics strategy
// ============================================================================

/// Raw score above which the image reads as high tension.
pub const COARSE_HIGH_SCORE: f64 = 120.0;
/// Raw score above which the image reads as moderate tension.
pub const COARSE_MEDIUM_SCORE: f64 = 70.0;

/// Map a raw coarse score onto the shared level scale.
/// Linear, with raw 70 landing on 35 and raw 120 on 65.
pub fn coarse_level(score: f64) -> f64 {
    (0.6 * score - 7.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStatistics {
    /// Grayscale standard deviation
    pub contrast: f64,
    /// Variance of the 4-neighbour Laplacian
    pub sharpness: f64,
}

impl ImageStatistics {
    pub fn compute(image: &GrayImage) -> Option<Self> {
        if image.is_empty() {
            return None;
        }
        let n = image.pixels.len() as f64;
        let mean = image.pixels.iter().map(|&p| p as f64).sum::<f64>() / n;
        let variance = image
            .pixels
            .iter()
            .map(|&p| (p as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            contrast: variance.sqrt(),
            sharpness: laplacian_variance(image),
        })
    }

    pub fn score(&self) -> f64 {
        0.6 * self.contrast + 0.4 * self.sharpness
    }
}

/// Variance of the Laplacian over interior pixels; 0 for images under 3x3.
fn laplacian_variance(image: &GrayImage) -> f64 {
    if image.width < 3 || image.height < 3 {
        return 0.0;
    }
    let mut values = Vec::with_capacity(((image.width - 2) * (image.height - 2)) as usize);
    for y in 1..image.height - 1 {
        for x in 1..image.width - 1 {
            let c = image.get(x, y) as f64;
            let lap = image.get(x - 1, y) as f64
                + image.get(x + 1, y) as f64
                + image.get(x, y - 1) as f64
                + image.get(x, y + 1) as f64
                - 4.0 * c;
            values.push(lap);
        }
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

#[derive(Debug, Clone, Default)]
pub struct CoarseStressEstimator;

impl CoarseStressEstimator {
    pub fn score(&self, stats: &ImageStatistics) -> StressEstimate {
        let raw = stats.score();
        let note = if raw > COARSE_HIGH_SCORE {
            "Можлива підвищена напруга або зосередженість."
        } else if raw > COARSE_MEDIUM_SCORE {
            "Стан помірної напруги, робочий режим."
        } else {
            "Загальний рівень напруги невисокий або стан розслабленості."
        };
        let factors = vec![
            note.to_string(),
            format!(
                "Оцінка за статистикою зображення: контраст {:.1}, різкість {:.1}.",
                stats.contrast, stats.sharpness
            ),
        ];
        StressEstimate::new(coarse_level(raw), factors, StressSource::ImageStatistics)
    }
}

impl StressEstimator for CoarseStressEstimator {
    fn name(&self) -> &'static str {
        "image_statistics"
    }

    fn estimate(&self, input: &StressInput<'_>) -> Option<StressEstimate> {
        let stats = ImageStatistics::compute(input.image?)?;
        Some(self.score(&stats))
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Landmarks first, then image statistics, then the neutral fallback.
pub fn select_stress(input: &StressInput<'_>) -> StressEstimate {
    let strategies: [&dyn StressEstimator; 2] =
        [&LandmarkStressEstimator::default(), &CoarseStressEstimator];
    for strategy in strategies {
        if let Some(estimate) = strategy.estimate(input) {
            tracing::debug!(
                "Stress estimated by {}: level {:.1} ({:?})",
                strategy.name(),
                estimate.level,
                estimate.label
            );
            return estimate;
        }
    }
    tracing::debug!("No stress input available, using neutral estimate");
    StressEstimate::unavailable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use portrait_core::{CoordinateSpace, LandmarkContract, Point, StressLabel};

    #[test]
    fn test_reference_face_is_baseline() {
        let mesh = fixtures::reference_face();
        let s = LandmarkStressEstimator::default()
            .estimate(&StressInput { landmarks: Some(&mesh), image: None })
            .unwrap();
        assert_eq!(s.level, 50.0);
        assert_eq!(s.label, StressLabel::Medium);
        assert_eq!(s.source, StressSource::Landmarks);
        assert_eq!(s.factors.len(), 1);
        assert!(s.factors[0].contains("Мінімальні ознаки"));
    }

    #[test]
    fn test_tense_face_scores_high() {
        let mesh = fixtures::tense_face();
        let s = select_stress(&StressInput { landmarks: Some(&mesh), image: None });
        assert_eq!(s.level, 90.0);
        assert_eq!(s.label, StressLabel::High);
        assert_eq!(s.factors.len(), 3);
    }

    #[test]
    fn test_relaxed_face_scores_low() {
        let mesh = fixtures::relaxed_face();
        let s = select_stress(&StressInput { landmarks: Some(&mesh), image: None });
        assert_eq!(s.level, 25.0);
        assert_eq!(s.label, StressLabel::Low);
        // three relaxed readings plus the minimal-tension note
        assert_eq!(s.factors.len(), 4);
    }

    #[test]
    fn test_unmeasured_metrics_are_skipped() {
        let metrics = TensionMetrics {
            eye_aperture: None,
            brow_height: Some(0.05),
            lip_ratio: None,
        };
        let s = LandmarkStressEstimator::default().score(&metrics);
        assert_eq!(s.level, 65.0);
        assert_eq!(s.label, StressLabel::Medium);
    }

    #[test]
    fn test_coarse_level_mapping() {
        assert_eq!(coarse_level(70.0), 35.0);
        assert_eq!(coarse_level(120.0), 65.0);
        assert_eq!(coarse_level(0.0), 0.0);
        assert_eq!(coarse_level(10_000.0), 100.0);
    }

    #[test]
    fn test_flat_image_is_low() {
        let image = GrayImage::new(16, 16, vec![128; 256]).unwrap();
        let input = StressInput { landmarks: None, image: Some(&image) };
        let s = CoarseStressEstimator.estimate(&input).unwrap();
        assert_eq!(s.level, 0.0);
        assert_eq!(s.label, StressLabel::Low);
        assert_eq!(s.source, StressSource::ImageStatistics);
    }

    #[test]
    fn test_checkerboard_is_high() {
        let pixels = (0..64u32).map(|i| if (i % 8 + i / 8) % 2 == 0 { 0 } else { 255 }).collect();
        let image = GrayImage::new(8, 8, pixels).unwrap();
        let stats = ImageStatistics::compute(&image).unwrap();
        assert!((stats.contrast - 127.5).abs() < 1e-9);
        assert!((stats.sharpness - 1020.0f64.powi(2)).abs() < 1e-6);
        assert_eq!(CoarseStressEstimator.score(&stats).label, StressLabel::High);
    }

    #[test]
    fn test_tiny_image_has_no_sharpness() {
        let image = GrayImage::new(2, 2, vec![0, 255, 255, 0]).unwrap();
        let stats = ImageStatistics::compute(&image).unwrap();
        assert_eq!(stats.sharpness, 0.0);
    }

    #[test]
    fn test_selection_prefers_landmarks() {
        let mesh = fixtures::reference_face();
        let image = GrayImage::new(4, 4, vec![0; 16]).unwrap();
        let s = select_stress(&StressInput { landmarks: Some(&mesh), image: Some(&image) });
        assert_eq!(s.source, StressSource::Landmarks);
    }

    #[test]
    fn test_selection_falls_back_to_image_then_neutral() {
        let sparse = Landmarks::default();
        let image = GrayImage::new(4, 4, vec![0; 16]).unwrap();
        let s = select_stress(&StressInput { landmarks: Some(&sparse), image: Some(&image) });
        assert_eq!(s.source, StressSource::ImageStatistics);

        let none = select_stress(&StressInput::default());
        assert_eq!(none, StressEstimate::unavailable());
    }

    #[test]
    fn test_coincident_mesh_falls_back_to_image() {
        let coincident = Landmarks {
            points: vec![Point::new(0.5, 0.5); LandmarkContract::MIN_POINTS],
            space: CoordinateSpace::Normalized,
            image_width: 640,
            image_height: 480,
        };
        let input = StressInput { landmarks: Some(&coincident), image: None };
        assert!(LandmarkStressEstimator::default().estimate(&input).is_none());

        let image = GrayImage::new(4, 4, vec![0; 16]).unwrap();
        let s = select_stress(&StressInput { landmarks: Some(&coincident), image: Some(&image) });
        assert_eq!(s.source, StressSource::ImageStatistics);
    }

    #[test]
    fn test_unmeasured_metrics_detected() {
        let empty = TensionMetrics {
            eye_aperture: None,
            brow_height: None,
            lip_ratio: None,
        };
        assert!(empty.is_unmeasured());
        let partial = TensionMetrics {
            lip_ratio: Some(0.1),
            ..empty
        };
        assert!(!partial.is_unmeasured());
    }
}
