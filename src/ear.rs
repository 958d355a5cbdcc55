//! Eye aspect ratio, after Soukupová and Čech, "Real-Time Eye Blink Detection
//! using Facial Landmarks" (2016).

use crate::error::DegenerateEye;
use crate::landmarks::EyeLandmarks;

/// Vertical lid separation over horizontal eye width.
///
/// ```text
/// EAR = (|P1 - P5| + |P2 - P4|) / (2 * |P0 - P3|)
/// ```
///
/// Roughly 0.3 for an open eye and close to zero for a closed one. The value
/// only depends on the shape of the eye, so it does not change when the eye is
/// moved or scaled.
///
/// Fails when the two corners coincide, or the coordinates are not finite,
/// instead of returning NaN or infinity. Corners a subnormal distance apart
/// (below about `1e-308` px) also fail, since the ratio overflows to
/// infinity there even though the corners differ.
pub fn eye_aspect_ratio(eye: &EyeLandmarks) -> Result<f64, DegenerateEye> {
    let [p0, p1, p2, p3, p4, p5] = eye.points();

    let vertical_a = p1.distance(p5);
    let vertical_b = p2.distance(p4);
    let horizontal = p0.distance(p3);

    if !(horizontal > 0.0 && horizontal.is_finite()) {
        return Err(DegenerateEye {
            corner_distance: horizontal,
        });
    }

    let ear = (vertical_a + vertical_b) / (2.0 * horizontal);
    if !ear.is_finite() {
        return Err(DegenerateEye {
            corner_distance: horizontal,
        });
    }
    Ok(ear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;

    fn eye(points: [(f64, f64); 6]) -> EyeLandmarks {
        EyeLandmarks(points.map(Point2D::from))
    }

    #[test]
    fn hand_computed_example() {
        let eye = eye([
            (0.0, 0.0),
            (2.0, 5.0),
            (4.0, 5.0),
            (6.0, 0.0),
            (4.0, 1.0),
            (2.0, 1.0),
        ]);
        // |P1 - P5| = 4, |P2 - P4| = 4, |P0 - P3| = 6
        let ear = eye_aspect_ratio(&eye).unwrap();
        assert!((ear - 8.0 / 12.0).abs() < 1e-12, "ear was {ear}");
    }

    #[test]
    fn diagonal_lid_distances() {
        let eye = eye([
            (0.0, 0.0),
            (1.0, 3.0),
            (5.0, 3.0),
            (6.0, 0.0),
            (2.0, 0.0),
            (4.0, 0.0),
        ]);
        // |P1 - P5| = |(1,3) - (4,0)| = sqrt(18), |P2 - P4| = |(5,3) - (2,0)| = sqrt(18)
        let expected = 2.0 * 18f64.sqrt() / 12.0;
        let ear = eye_aspect_ratio(&eye).unwrap();
        assert!((ear - expected).abs() < 1e-12);
    }

    #[test]
    fn closed_eye_is_zero() {
        let eye = eye([
            (0.0, 0.0),
            (2.0, 0.0),
            (4.0, 0.0),
            (6.0, 0.0),
            (4.0, 0.0),
            (2.0, 0.0),
        ]);
        assert_eq!(eye_aspect_ratio(&eye).unwrap(), 0.0);
    }

    #[test]
    fn coinciding_corners_are_degenerate() {
        let eye = eye([
            (3.0, 3.0),
            (2.0, 5.0),
            (4.0, 5.0),
            (3.0, 3.0),
            (4.0, 1.0),
            (2.0, 1.0),
        ]);
        let err = eye_aspect_ratio(&eye).unwrap_err();
        assert_eq!(err.corner_distance, 0.0);
    }

    #[test]
    fn nan_coordinates_are_degenerate() {
        let eye = eye([
            (f64::NAN, 0.0),
            (2.0, 5.0),
            (4.0, 5.0),
            (6.0, 0.0),
            (4.0, 1.0),
            (2.0, 1.0),
        ]);
        assert!(eye_aspect_ratio(&eye).is_err());
    }

    #[test]
    fn subnormal_corner_distance_is_degenerate() {
        let eye = eye([
            (0.0, 0.0),
            (2.0, 5.0),
            (4.0, 5.0),
            (1e-310, 0.0),
            (4.0, 1.0),
            (2.0, 1.0),
        ]);
        assert!(eye_aspect_ratio(&eye).is_err());
    }
}
