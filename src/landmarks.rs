//! Landmark containers and the index layout of the landmark model.
//!
//! The iBUG 68 point layout, as produced by dlib's `shape_predictor_68` and
//! OpenCV's LBF facemark model:
//!
//! - 0-16: Jaw outline
//! - 17-21: Right eyebrow
//! - 22-26: Left eyebrow
//! - 27-35: Nose
//! - 36-41: Right eye
//! - 42-47: Left eye
//! - 48-59: Outer lip
//! - 60-67: Inner lip
//!
//! Left and right are the subject's, so the right eye shows up on the left of
//! an unmirrored image.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::{EyeError, EyeResult};
use crate::geometry::Point2D;

/// Points describing one eye.
pub const EYE_POINT_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeSide {
    Left,
    Right,
}

impl fmt::Display for EyeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeSide::Left => write!(f, "left"),
            EyeSide::Right => write!(f, "right"),
        }
    }
}

/// Where a landmark model puts the eyes in its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkScheme {
    pub point_count: usize,
    pub right_eye: Range<usize>,
    pub left_eye: Range<usize>,
}

impl LandmarkScheme {
    pub const IBUG_68: LandmarkScheme = LandmarkScheme {
        point_count: 68,
        right_eye: 36..42,
        left_eye: 42..48,
    };

    pub fn eye_range(&self, side: EyeSide) -> Range<usize> {
        match side {
            EyeSide::Left => self.left_eye.clone(),
            EyeSide::Right => self.right_eye.clone(),
        }
    }
}

impl Default for LandmarkScheme {
    fn default() -> Self {
        Self::IBUG_68
    }
}

/// Six points of one eye in order: outer corner, two upper lid points,
/// inner corner, two lower lid points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeLandmarks(pub [Point2D; EYE_POINT_COUNT]);

impl EyeLandmarks {
    pub fn points(&self) -> &[Point2D; EYE_POINT_COUNT] {
        &self.0
    }

    pub fn map(&self, f: impl Fn(&Point2D) -> Point2D) -> Self {
        Self(self.0.map(|point| f(&point)))
    }
}

impl TryFrom<&[Point2D]> for EyeLandmarks {
    type Error = EyeError;

    fn try_from(points: &[Point2D]) -> EyeResult<Self> {
        let points: [Point2D; EYE_POINT_COUNT] =
            points
                .try_into()
                .map_err(|_| EyeError::MalformedLandmarks {
                    expected: EYE_POINT_COUNT,
                    actual: points.len(),
                })?;
        Ok(Self(points))
    }
}

/// Full landmark set for one detected face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point2D>,
    scheme: LandmarkScheme,
}

impl FaceLandmarks {
    /// Wraps points laid out in the iBUG 68 scheme.
    pub fn new(points: Vec<Point2D>) -> EyeResult<Self> {
        Self::with_scheme(points, LandmarkScheme::IBUG_68)
    }

    pub fn with_scheme(points: Vec<Point2D>, scheme: LandmarkScheme) -> EyeResult<Self> {
        if points.len() != scheme.point_count {
            return Err(EyeError::MalformedLandmarks {
                expected: scheme.point_count,
                actual: points.len(),
            });
        }
        Ok(Self { points, scheme })
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn eye(&self, side: EyeSide) -> EyeResult<EyeLandmarks> {
        let range = self.scheme.eye_range(side);
        let points = self
            .points
            .get(range.clone())
            .ok_or(EyeError::MalformedLandmarks {
                expected: range.end,
                actual: self.points.len(),
            })?;
        EyeLandmarks::try_from(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_points(count: usize) -> Vec<Point2D> {
        (0..count).map(|i| Point2D::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn eye_windows_are_inside_the_model() {
        let scheme = LandmarkScheme::IBUG_68;
        assert!(scheme.right_eye.end <= scheme.point_count);
        assert!(scheme.left_eye.end <= scheme.point_count);
        assert_eq!(scheme.right_eye.len(), EYE_POINT_COUNT);
        assert_eq!(scheme.left_eye.len(), EYE_POINT_COUNT);
    }

    #[test]
    fn extracts_eyes_by_side() {
        let face = FaceLandmarks::new(indexed_points(68)).unwrap();

        let right = face.eye(EyeSide::Right).unwrap();
        assert_eq!(right.points()[0].x, 36.0);
        assert_eq!(right.points()[5].x, 41.0);

        let left = face.eye(EyeSide::Left).unwrap();
        assert_eq!(left.points()[0].x, 42.0);
        assert_eq!(left.points()[5].x, 47.0);
    }

    #[test]
    fn rejects_wrong_point_count() {
        let err = FaceLandmarks::new(indexed_points(67)).unwrap_err();
        assert!(matches!(
            err,
            EyeError::MalformedLandmarks {
                expected: 68,
                actual: 67
            }
        ));
    }

    #[test]
    fn eye_needs_exactly_six_points() {
        let points = indexed_points(5);
        let err = EyeLandmarks::try_from(points.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            EyeError::MalformedLandmarks {
                expected: 6,
                actual: 5
            }
        ));
    }

    #[test]
    fn custom_scheme_with_short_eye_window_is_malformed() {
        let scheme = LandmarkScheme {
            point_count: 10,
            right_eye: 0..6,
            left_eye: 6..10,
        };
        let face = FaceLandmarks::with_scheme(indexed_points(10), scheme).unwrap();
        assert!(face.eye(EyeSide::Right).is_ok());
        assert!(matches!(
            face.eye(EyeSide::Left),
            Err(EyeError::MalformedLandmarks {
                expected: 6,
                actual: 4
            })
        ));
    }
}
