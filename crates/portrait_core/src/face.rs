//! Boundary types exchanged with the face model backend.
//!
//! The backend is an external service; these structures are the contract it
//! fulfils. A photo without a usable face is represented by `None` at the call
//! site, never by an empty `FaceAnalysis`.

use crate::emotion::EmotionDistribution;
use serde::{Deserialize, Serialize};

/// One 2D landmark point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Coordinate convention used by the backend for landmark points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// x / width, y / height in [0, 1] (MediaPipe convention)
    #[default]
    Normalized,
    /// Absolute pixel coordinates
    Pixel,
}

/// Ordered landmark sequence for a single face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmarks {
    pub points: Vec<Point>,
    #[serde(default)]
    pub space: CoordinateSpace,
    /// Source image width in pixels
    pub image_width: u32,
    /// Source image height in pixels
    pub image_height: u32,
}

impl Landmarks {
    /// Build a mesh of `len` points from sparse `(index, point)` anchors.
    /// Unlisted indices are left at the origin; out-of-range indices are ignored.
    pub fn from_indexed<I>(
        anchors: I,
        len: usize,
        space: CoordinateSpace,
        image_width: u32,
        image_height: u32,
    ) -> Self
    where
        I: IntoIterator<Item = (usize, Point)>,
    {
        let mut points = vec![Point::default(); len];
        for (idx, point) in anchors {
            if let Some(slot) = points.get_mut(idx) {
                *slot = point;
            }
        }
        Self { points, space, image_width, image_height }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in pixel space, so Euclidean distances keep the image aspect ratio.
    /// Normalized points with unknown image size are returned unchanged.
    pub fn to_pixels(&self) -> Vec<Point> {
        match self.space {
            CoordinateSpace::Pixel => self.points.clone(),
            CoordinateSpace::Normalized if self.image_width > 0 && self.image_height > 0 => {
                let (w, h) = (self.image_width as f64, self.image_height as f64);
                self.points.iter().map(|p| Point::new(p.x * w, p.y * h)).collect()
            }
            CoordinateSpace::Normalized => self.points.clone(),
        }
    }
}

/// Result of a successful face detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAnalysis {
    /// Estimated age, 0 = unknown
    #[serde(default)]
    pub age: u32,
    /// Free text as reported by the backend
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub emotion: EmotionDistribution,
    #[serde(default)]
    pub dominant_emotion: String,
    #[serde(default)]
    pub landmarks: Option<Landmarks>,
    /// Advisory quality hints
    #[serde(default)]
    pub blur_score: Option<f64>,
    #[serde(default)]
    pub frontal_score: Option<f64>,
}

impl FaceAnalysis {
    pub fn new(emotion: EmotionDistribution) -> Self {
        Self {
            age: 0,
            gender: String::new(),
            emotion,
            dominant_emotion: String::new(),
            landmarks: None,
            blur_score: None,
            frontal_score: None,
        }
    }
}

/// 8-bit grayscale raster, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl GrayImage {
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.midpoint(&b), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_normalized_to_pixels() {
        let lm = Landmarks {
            points: vec![Point::new(0.5, 0.25)],
            space: CoordinateSpace::Normalized,
            image_width: 200,
            image_height: 400,
        };
        assert_eq!(lm.to_pixels(), vec![Point::new(100.0, 100.0)]);
    }

    #[test]
    fn test_pixel_space_unchanged() {
        let lm = Landmarks {
            points: vec![Point::new(12.0, 7.0)],
            space: CoordinateSpace::Pixel,
            image_width: 200,
            image_height: 400,
        };
        assert_eq!(lm.to_pixels(), lm.points);
    }

    #[test]
    fn test_face_analysis_minimal_json() {
        let json = r#"{
            "age": 31,
            "gender": "Woman",
            "emotion": {"Happy": 90.0, "neutral": 10.0},
            "dominant_emotion": "happy"
        }"#;
        let face: FaceAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(face.age, 31);
        assert_eq!(face.emotion.get("happy"), Some(90.0));
        assert!(face.landmarks.is_none());
        assert!(face.blur_score.is_none());
    }

    #[test]
    fn test_gray_image_dimension_check() {
        assert!(GrayImage::new(2, 2, vec![0; 4]).is_some());
        assert!(GrayImage::new(2, 2, vec![0; 3]).is_none());
        let img = GrayImage::new(2, 1, vec![10, 20]).unwrap();
        assert_eq!(img.get(1, 0), 20);
    }
}
