//! Hand-placed face meshes in a 1000x1000 pixel frame.

use portrait_core::{CoordinateSpace, LandmarkContract as L, Landmarks, Point};

fn mesh(anchors: &[(usize, (f64, f64))]) -> Landmarks {
    Landmarks::from_indexed(
        anchors.iter().map(|(i, (x, y))| (*i, Point::new(*x, *y))),
        L::MIN_POINTS,
        CoordinateSpace::Pixel,
        1000,
        1000,
    )
}

/// Lid, brow and lip positions vary; everything else is shared.
fn face(lids: (f64, f64), brow_y: f64, lips: (f64, f64)) -> Landmarks {
    mesh(&[
        (L::CHEEK_LEFT, (300.0, 500.0)),
        (L::CHEEK_RIGHT, (700.0, 500.0)),
        (L::GLABELLA, (500.0, 400.0)),
        (L::UPPER_LIP, (500.0, 628.0)),
        (L::FOREHEAD, (500.0, 250.0)),
        (L::CHIN, (500.0, 800.0)),
        (L::JAW_LEFT, (350.0, 700.0)),
        (L::JAW_RIGHT, (650.0, 700.0)),
        (L::BROW_LEFT, (420.0, brow_y)),
        (L::BROW_RIGHT, (580.0, brow_y)),
        (L::EYE_LEFT_UPPER, (420.0, lids.0)),
        (L::EYE_LEFT_LOWER, (420.0, lids.1)),
        (L::EYE_RIGHT_UPPER, (580.0, lids.0)),
        (L::EYE_RIGHT_LOWER, (580.0, lids.1)),
        (L::EYE_LEFT_OUTER, (380.0, 480.0)),
        (L::EYE_LEFT_INNER, (460.0, 480.0)),
        (L::EYE_RIGHT_INNER, (540.0, 480.0)),
        (L::EYE_RIGHT_OUTER, (620.0, 480.0)),
        (L::MOUTH_LEFT, (440.0, 680.0)),
        (L::MOUTH_RIGHT, (560.0, 680.0)),
        (L::LIP_UPPER_INNER, (500.0, lips.0)),
        (L::LIP_LOWER_INNER, (500.0, lips.1)),
    ])
}

/// Symmetric face with no tension cues.
pub fn reference_face() -> Landmarks {
    face((470.0, 490.0), 425.0, (670.0, 690.0))
}

/// Narrowed eyes, lowered brows and compressed lips.
pub fn tense_face() -> Landmarks {
    face((475.0, 485.0), 445.0, (678.0, 682.0))
}

/// Wide eyes, raised brows and parted lips.
pub fn relaxed_face() -> Landmarks {
    face((462.0, 498.0), 400.0, (655.0, 705.0))
}
