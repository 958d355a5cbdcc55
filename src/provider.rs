use tracing::warn;

use crate::geometry::{FaceRegion, Point2D};

/// Raw output of a landmark model for one face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    pub region: FaceRegion,
    pub landmarks: Vec<Point2D>,
}

/// Finds faces in a grayscale image and places landmarks on them.
pub trait LandmarkProvider {
    type Image: ?Sized;

    /// Order of the returned faces carries no meaning. An empty result is a
    /// normal frame without faces.
    fn detect_faces(&mut self, image: &Self::Image) -> anyhow::Result<Vec<FaceRegion>>;

    fn extract_landmarks(
        &mut self,
        image: &Self::Image,
        region: &FaceRegion,
    ) -> anyhow::Result<Vec<Point2D>>;

    /// Detects faces and fits landmarks on each. A face whose landmarks
    /// cannot be fitted is logged and left out; only a failed detection
    /// fails the frame.
    fn detect(&mut self, image: &Self::Image) -> anyhow::Result<Vec<FaceDetection>> {
        let regions = self.detect_faces(image)?;
        let mut detections = Vec::with_capacity(regions.len());
        for region in regions {
            match self.extract_landmarks(image, &region) {
                Ok(landmarks) => detections.push(FaceDetection { region, landmarks }),
                Err(err) => warn!(region = ?region, "skipping face without landmarks: {err:#}"),
            }
        }
        Ok(detections)
    }
}
