//! Per frame classification of every detected face.

use tracing::{debug, warn};

use crate::classifier::{EyeStateClassifier, FaceReading};
use crate::error::EyeResult;
#[cfg(doc)]
use crate::error::EyeError;
use crate::geometry::{FaceRegion, Point2D};
use crate::landmarks::{FaceLandmarks, LandmarkScheme};
use crate::provider::FaceDetection;

/// What gets drawn for each classified face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationStyle {
    pub draw_landmarks: bool,
    pub draw_label: bool,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            draw_landmarks: false,
            draw_label: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceAnnotation<'a> {
    pub region: FaceRegion,
    pub reading: FaceReading,
    pub landmarks: Option<&'a [Point2D]>,
    pub label: Option<String>,
}

/// Image the classified faces are drawn onto. The frame stays owned by the
/// caller and is annotated in place.
pub trait FrameCanvas {
    fn draw_face(&mut self, annotation: &FaceAnnotation<'_>) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct FaceOutcome {
    pub region: FaceRegion,
    pub reading: EyeResult<FaceReading>,
}

#[derive(Debug, Default)]
pub struct FrameReport {
    pub faces: Vec<FaceOutcome>,
    pub any_eyes_open: bool,
}

impl FrameReport {
    pub fn readings(&self) -> impl Iterator<Item = &FaceReading> {
        self.faces.iter().filter_map(|face| face.reading.as_ref().ok())
    }

    pub fn open_faces(&self) -> usize {
        self.readings().filter(|reading| reading.state.is_open()).count()
    }

    pub fn failed_faces(&self) -> usize {
        self.faces.iter().filter(|face| face.reading.is_err()).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameClassifier {
    classifier: EyeStateClassifier,
    scheme: LandmarkScheme,
    style: AnnotationStyle,
}

impl FrameClassifier {
    pub fn new(classifier: EyeStateClassifier, style: AnnotationStyle) -> Self {
        Self {
            classifier,
            scheme: LandmarkScheme::IBUG_68,
            style,
        }
    }

    pub fn with_scheme(mut self, scheme: LandmarkScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn classifier(&self) -> &EyeStateClassifier {
        &self.classifier
    }

    /// Classifies every face and draws the results onto `canvas`.
    ///
    /// Landmarks with the wrong number of points fail the whole frame before
    /// anything is drawn. A face whose eye geometry is degenerate is reported
    /// in its own outcome, left undrawn and does not count as open.
    ///
    /// A canvas error stops drawing and returns [`EyeError::Render`] without
    /// the report. Faces drawn before the failing one stay on the canvas.
    pub fn classify_frame<C>(
        &self,
        canvas: &mut C,
        faces: &[FaceDetection],
    ) -> EyeResult<FrameReport>
    where
        C: FrameCanvas + ?Sized,
    {
        let landmarks = faces
            .iter()
            .map(|face| FaceLandmarks::with_scheme(face.landmarks.clone(), self.scheme.clone()))
            .collect::<EyeResult<Vec<_>>>()?;

        let mut report = FrameReport::default();
        for (face, landmarks) in faces.iter().zip(&landmarks) {
            let reading = self.classifier.classify_face(landmarks);
            match &reading {
                Ok(reading) => {
                    debug!(
                        region = ?face.region,
                        left_ear = reading.left_ear,
                        right_ear = reading.right_ear,
                        ear = reading.ear,
                        state = %reading.state,
                        "classified face"
                    );
                    report.any_eyes_open |= reading.state.is_open();
                }
                Err(err) => warn!(region = ?face.region, "skipping face: {err:#}"),
            }
            report.faces.push(FaceOutcome {
                region: face.region,
                reading,
            });
        }

        for (outcome, landmarks) in report.faces.iter().zip(&landmarks) {
            let Ok(reading) = &outcome.reading else {
                continue;
            };
            let annotation = FaceAnnotation {
                region: outcome.region,
                reading: *reading,
                landmarks: self.style.draw_landmarks.then(|| landmarks.points()),
                label: self
                    .style
                    .draw_label
                    .then(|| format!("{} ({:.2})", reading.state.label(), reading.ear)),
            };
            canvas.draw_face(&annotation)?;
        }

        Ok(report)
    }
}
