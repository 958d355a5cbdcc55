use serde::Serialize;
use std::fmt;

use crate::ear::eye_aspect_ratio;
use crate::error::{EyeError, EyeResult};
use crate::landmarks::{EyeSide, FaceLandmarks};

/// Average eye aspect ratio above which eyes count as open.
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Eyes are open when the averaged ratio is strictly above this value.
    /// A ratio exactly on the threshold is closed.
    pub ear_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
        }
    }
}

impl ClassifierConfig {
    pub fn with_threshold(ear_threshold: f64) -> Self {
        Self { ear_threshold }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeState {
    Open,
    Closed,
}

impl EyeState {
    pub fn is_open(&self) -> bool {
        matches!(self, EyeState::Open)
    }

    /// BGR color used when drawing a face in this state.
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            EyeState::Open => (0, 255, 0),
            EyeState::Closed => (0, 0, 255),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EyeState::Open => "Eyes open",
            EyeState::Closed => "Eyes closed",
        }
    }
}

impl fmt::Display for EyeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeState::Open => write!(f, "open"),
            EyeState::Closed => write!(f, "closed"),
        }
    }
}

/// Decision for one face together with the ratios behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceReading {
    pub state: EyeState,
    pub ear: f64,
    pub left_ear: f64,
    pub right_ear: f64,
}

#[derive(Debug, Clone)]
pub struct EyeStateClassifier {
    config: ClassifierConfig,
}

impl EyeStateClassifier {
    pub fn new(config: ClassifierConfig) -> EyeResult<Self> {
        let threshold = config.ear_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(EyeError::InvalidThreshold(threshold));
        }
        Ok(Self { config })
    }

    pub fn threshold(&self) -> f64 {
        self.config.ear_threshold
    }

    pub fn state_for(&self, ear: f64) -> EyeState {
        if ear > self.config.ear_threshold {
            EyeState::Open
        } else {
            EyeState::Closed
        }
    }

    pub fn classify_face(&self, face: &FaceLandmarks) -> EyeResult<FaceReading> {
        let left_ear = self.eye_ratio(face, EyeSide::Left)?;
        let right_ear = self.eye_ratio(face, EyeSide::Right)?;

        let ear = (left_ear + right_ear) / 2.0;
        Ok(FaceReading {
            state: self.state_for(ear),
            ear,
            left_ear,
            right_ear,
        })
    }

    fn eye_ratio(&self, face: &FaceLandmarks, side: EyeSide) -> EyeResult<f64> {
        let eye = face.eye(side)?;
        eye_aspect_ratio(&eye).map_err(|source| EyeError::DegenerateGeometry { side, source })
    }
}

impl Default for EyeStateClassifier {
    fn default() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;

    /// Face with both eyes 6px wide and `lid` px between the lids.
    fn face_with_lid_gap(lid: f64) -> FaceLandmarks {
        let mut points = vec![Point2D::default(); 68];
        for (start, offset) in [(36, 100.0), (42, 200.0)] {
            let eye = [
                (0.0, 0.0),
                (2.0, -lid / 2.0),
                (4.0, -lid / 2.0),
                (6.0, 0.0),
                (4.0, lid / 2.0),
                (2.0, lid / 2.0),
            ];
            for (i, (x, y)) in eye.into_iter().enumerate() {
                points[start + i] = Point2D::new(x + offset, y + 100.0);
            }
        }
        FaceLandmarks::new(points).unwrap()
    }

    #[test]
    fn open_and_closed_faces() {
        let classifier = EyeStateClassifier::default();

        // ear = lid / 6
        let open = classifier.classify_face(&face_with_lid_gap(3.0)).unwrap();
        assert_eq!(open.state, EyeState::Open);
        assert!((open.ear - 0.5).abs() < 1e-12);

        let closed = classifier.classify_face(&face_with_lid_gap(0.6)).unwrap();
        assert_eq!(closed.state, EyeState::Closed);
        assert!((closed.ear - 0.1).abs() < 1e-12);
    }

    #[test]
    fn threshold_itself_is_closed() {
        let classifier = EyeStateClassifier::default();
        assert_eq!(classifier.state_for(DEFAULT_EAR_THRESHOLD), EyeState::Closed);
        assert_eq!(
            classifier.state_for(DEFAULT_EAR_THRESHOLD + 1e-9),
            EyeState::Open
        );
        // lid gap 1.5 over width 6 lands exactly on 0.25
        let reading = classifier.classify_face(&face_with_lid_gap(1.5)).unwrap();
        assert_eq!(reading.ear, 0.25);
        assert_eq!(reading.state, EyeState::Closed);
    }

    #[test]
    fn averages_both_eyes() {
        let mut points = face_with_lid_gap(3.0).points().to_vec();
        // flatten the right eye lids
        for i in [37, 38, 40, 41] {
            points[i].y = points[36].y;
        }
        let face = FaceLandmarks::new(points).unwrap();

        let reading = EyeStateClassifier::default().classify_face(&face).unwrap();
        assert_eq!(reading.right_ear, 0.0);
        assert!((reading.left_ear - 0.5).abs() < 1e-12);
        assert!((reading.ear - 0.25).abs() < 1e-12);
    }

    #[test]
    fn custom_threshold() {
        let classifier =
            EyeStateClassifier::new(ClassifierConfig::with_threshold(0.6)).unwrap();
        let reading = classifier.classify_face(&face_with_lid_gap(3.0)).unwrap();
        assert_eq!(reading.state, EyeState::Closed);
    }

    #[test]
    fn rejects_bad_thresholds() {
        for threshold in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                EyeStateClassifier::new(ClassifierConfig::with_threshold(threshold)),
                Err(EyeError::InvalidThreshold(_))
            ));
        }
    }

    #[test]
    fn degenerate_eye_names_the_side() {
        let mut points = face_with_lid_gap(3.0).points().to_vec();
        points[45] = points[42];
        let face = FaceLandmarks::new(points).unwrap();

        let err = EyeStateClassifier::default()
            .classify_face(&face)
            .unwrap_err();
        assert!(matches!(
            err,
            EyeError::DegenerateGeometry {
                side: EyeSide::Left,
                ..
            }
        ));
    }
}
