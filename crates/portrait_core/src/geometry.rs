//! Facial geometry extraction.
//!
//! Converts a dense face mesh into five bounded ratios that feed the trait
//! estimator. Every ratio is built from distances between fixed landmark
//! indices; those indices are a contract with the upstream face-mesh backend
//! and live in one table, `LandmarkContract`.

use crate::face::{Landmarks, Point};
use serde::{Deserialize, Serialize};

/// Landmark Index Contract (MediaPipe Face Mesh, 468-point topology).
///
/// "Left" and "right" refer to image sides. If the backend changes its
/// landmark ordering, this table is the only thing that needs updating.
pub struct LandmarkContract;

impl LandmarkContract {
    pub const MIN_POINTS: usize = 468;

    pub const FOREHEAD: usize = 10;
    pub const CHIN: usize = 152;
    pub const GLABELLA: usize = 9;
    pub const UPPER_LIP: usize = 0;

    pub const CHEEK_LEFT: usize = 234;
    pub const CHEEK_RIGHT: usize = 454;
    pub const JAW_LEFT: usize = 172;
    pub const JAW_RIGHT: usize = 397;

    pub const BROW_LEFT: usize = 105;
    pub const BROW_RIGHT: usize = 334;

    pub const EYE_LEFT_UPPER: usize = 159;
    pub const EYE_LEFT_LOWER: usize = 145;
    pub const EYE_LEFT_OUTER: usize = 33;
    pub const EYE_LEFT_INNER: usize = 133;
    pub const EYE_RIGHT_UPPER: usize = 386;
    pub const EYE_RIGHT_LOWER: usize = 374;
    pub const EYE_RIGHT_INNER: usize = 362;
    pub const EYE_RIGHT_OUTER: usize = 263;

    pub const MOUTH_LEFT: usize = 61;
    pub const MOUTH_RIGHT: usize = 291;
    pub const LIP_UPPER_INNER: usize = 13;
    pub const LIP_LOWER_INNER: usize = 14;

    /// Bilateral pairs mirrored against each other for the symmetry ratio.
    pub const MIRROR_PAIRS: [(usize, usize); 8] = [
        (Self::EYE_LEFT_OUTER, Self::EYE_RIGHT_OUTER),
        (Self::EYE_LEFT_INNER, Self::EYE_RIGHT_INNER),
        (Self::EYE_LEFT_UPPER, Self::EYE_RIGHT_UPPER),
        (Self::EYE_LEFT_LOWER, Self::EYE_RIGHT_LOWER),
        (Self::BROW_LEFT, Self::BROW_RIGHT),
        (Self::MOUTH_LEFT, Self::MOUTH_RIGHT),
        (Self::CHEEK_LEFT, Self::CHEEK_RIGHT),
        (Self::JAW_LEFT, Self::JAW_RIGHT),
    ];
}

pub const FWHR_RANGE: (f64, f64) = (1.2, 2.6);
pub const SYMMETRY_RANGE: (f64, f64) = (0.5, 1.0);

/// Five normalized facial ratios.
///
/// `GeometryProfile::default()` holds the documented fallbacks used when no
/// mesh is available. A default value is never evidence of a measurement:
/// measured geometry travels as `Some(profile)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryProfile {
    /// Face width / upper-face height, typical 1.4 - 2.2
    pub fwhr: f64,
    /// Bilateral symmetry (0.5 - 1.0, 1 = perfectly symmetric)
    pub symmetry: f64,
    /// Jaw tension (0.0 - 1.0)
    pub jaw: f64,
    /// Brow height above the eye (0.0 - 1.0)
    pub brow: f64,
    /// Eye openness (0.0 - 1.0)
    pub eyes: f64,
}

impl Default for GeometryProfile {
    fn default() -> Self {
        Self {
            fwhr: 1.75,
            symmetry: 0.85,
            jaw: 0.5,
            brow: 0.5,
            eyes: 0.5,
        }
    }
}

impl GeometryProfile {
    /// Clamp every ratio into its documented range; non-finite values fall back to defaults.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        let fix = |v: f64, fallback: f64, lo: f64, hi: f64| {
            if v.is_finite() { v.clamp(lo, hi) } else { fallback }
        };
        Self {
            fwhr: fix(self.fwhr, d.fwhr, FWHR_RANGE.0, FWHR_RANGE.1),
            symmetry: fix(self.symmetry, d.symmetry, SYMMETRY_RANGE.0, SYMMETRY_RANGE.1),
            jaw: fix(self.jaw, d.jaw, 0.0, 1.0),
            brow: fix(self.brow, d.brow, 0.0, 1.0),
            eyes: fix(self.eyes, d.eyes, 0.0, 1.0),
        }
    }

    /// One physiognomic reading per ratio, in fixed order.
    pub fn interpret(&self) -> Vec<&'static str> {
        let mut readings = Vec::with_capacity(5);

        readings.push(if self.fwhr > 1.9 {
            "висока домінантність, рішучість, лідерський тип"
        } else if self.fwhr > 1.7 {
            "помірна домінантність, збалансований темперамент"
        } else {
            "мʼякість, чутливість, низька конфліктність"
        });

        readings.push(if self.symmetry > 0.9 {
            "стабільний емоційний фон, хороша стресостійкість"
        } else {
            "схильність до емоційних коливань"
        });

        readings.push(if self.jaw > 0.6 {
            "сильний вольовий компонент, наполегливість"
        } else {
            "гнучкість, дипломатичність"
        });

        readings.push(if self.brow > 0.45 {
            "висока чутливість, емпатія, соціальна уважність"
        } else {
            "прямолінійність, твердість, рішучість"
        });

        readings.push(if self.eyes < 0.25 {
            "фокусованість, контроль, низька імпульсивність"
        } else {
            "емоційність, відкритість"
        });

        readings
    }
}

/// A face mesh in pixel space with the contract's measurements.
#[derive(Debug, Clone)]
pub struct FaceMesh {
    points: Vec<Point>,
}

impl FaceMesh {
    /// `None` when the mesh is too small to satisfy the landmark contract or
    /// has no measurable face width or height.
    pub fn from_landmarks(landmarks: &Landmarks) -> Option<Self> {
        if landmarks.len() < LandmarkContract::MIN_POINTS {
            tracing::debug!(
                "Face mesh has {} points, need {}",
                landmarks.len(),
                LandmarkContract::MIN_POINTS
            );
            return None;
        }
        let points = landmarks.to_pixels();
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            tracing::warn!("Face mesh contains non-finite coordinates, ignoring");
            return None;
        }
        let mesh = Self { points };
        let (width, height) = (mesh.face_width(), mesh.face_height());
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            tracing::debug!("Face mesh is degenerate ({}x{}), ignoring", width, height);
            return None;
        }
        Some(mesh)
    }

    fn p(&self, idx: usize) -> &Point {
        &self.points[idx]
    }

    fn dist(&self, a: usize, b: usize) -> f64 {
        self.p(a).distance(self.p(b))
    }

    pub fn face_width(&self) -> f64 {
        self.dist(LandmarkContract::CHEEK_LEFT, LandmarkContract::CHEEK_RIGHT)
    }

    pub fn face_height(&self) -> f64 {
        self.dist(LandmarkContract::FOREHEAD, LandmarkContract::CHIN)
    }

    pub fn upper_face_height(&self) -> f64 {
        self.dist(LandmarkContract::GLABELLA, LandmarkContract::UPPER_LIP)
    }

    /// Mean eyelid gap of both eyes.
    pub fn eyelid_gap(&self) -> f64 {
        let left = self.dist(LandmarkContract::EYE_LEFT_UPPER, LandmarkContract::EYE_LEFT_LOWER);
        let right = self.dist(LandmarkContract::EYE_RIGHT_UPPER, LandmarkContract::EYE_RIGHT_LOWER);
        (left + right) / 2.0
    }

    /// Mean eye width (outer to inner corner) of both eyes.
    pub fn eye_width(&self) -> f64 {
        let left = self.dist(LandmarkContract::EYE_LEFT_OUTER, LandmarkContract::EYE_LEFT_INNER);
        let right = self.dist(LandmarkContract::EYE_RIGHT_OUTER, LandmarkContract::EYE_RIGHT_INNER);
        (left + right) / 2.0
    }

    /// Mean distance from each brow to the center of the eye below it.
    pub fn brow_eye_distance(&self) -> f64 {
        let left_eye = self
            .p(LandmarkContract::EYE_LEFT_UPPER)
            .midpoint(self.p(LandmarkContract::EYE_LEFT_LOWER));
        let right_eye = self
            .p(LandmarkContract::EYE_RIGHT_UPPER)
            .midpoint(self.p(LandmarkContract::EYE_RIGHT_LOWER));
        let left = self.p(LandmarkContract::BROW_LEFT).distance(&left_eye);
        let right = self.p(LandmarkContract::BROW_RIGHT).distance(&right_eye);
        (left + right) / 2.0
    }

    pub fn mouth_width(&self) -> f64 {
        self.dist(LandmarkContract::MOUTH_LEFT, LandmarkContract::MOUTH_RIGHT)
    }

    pub fn mouth_height(&self) -> f64 {
        self.dist(LandmarkContract::LIP_UPPER_INNER, LandmarkContract::LIP_LOWER_INNER)
    }

    /// Mean mirrored positional difference over `MIRROR_PAIRS`, in face widths.
    fn asymmetry(&self) -> Option<f64> {
        let width = self.face_width();
        if width <= 0.0 {
            return None;
        }
        let cheek_left = self.p(LandmarkContract::CHEEK_LEFT);
        let cheek_right = self.p(LandmarkContract::CHEEK_RIGHT);
        let axis = (cheek_left.x + cheek_right.x) / 2.0;
        let total: f64 = LandmarkContract::MIRROR_PAIRS
            .iter()
            .map(|&(l, r)| {
                let left = self.p(l);
                let right = self.p(r);
                let mirrored_x = 2.0 * axis - right.x;
                (left.x - mirrored_x).abs() + (left.y - right.y).abs()
            })
            .sum();
        Some(total / LandmarkContract::MIRROR_PAIRS.len() as f64 / width)
    }

    /// Compute the clamped geometry profile.
    pub fn geometry(&self) -> GeometryProfile {
        let d = GeometryProfile::default();
        let face_height = self.face_height();
        let face_width = self.face_width();

        let fwhr = ratio(face_width, self.upper_face_height()).unwrap_or(d.fwhr);
        let symmetry = self.asymmetry().map(|a| 1.0 - a).unwrap_or(d.symmetry);
        let jaw = ratio(
            self.dist(LandmarkContract::JAW_LEFT, LandmarkContract::JAW_RIGHT),
            face_width,
        )
        .map(|r| (r - 0.5) * 2.0)
        .unwrap_or(d.jaw);
        let brow = ratio(self.brow_eye_distance(), face_height)
            .map(|r| r * 5.0)
            .unwrap_or(d.brow);
        let eyes = ratio(self.eyelid_gap(), face_height)
            .map(|r| r * 10.0)
            .unwrap_or(d.eyes);

        GeometryProfile { fwhr, symmetry, jaw, brow, eyes }.clamped()
    }
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 && den.is_finite() && num.is_finite() {
        Some(num / den)
    } else {
        None
    }
}

/// Extract geometry from a face mesh. `None` means "not measured".
pub fn extract_geometry(landmarks: &Landmarks) -> Option<GeometryProfile> {
    FaceMesh::from_landmarks(landmarks).map(|mesh| mesh.geometry())
}
