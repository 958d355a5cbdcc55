use clap::Args;
use std::path::PathBuf;

use crate::classifier::{ClassifierConfig, EyeStateClassifier, DEFAULT_EAR_THRESHOLD};
use crate::error::EyeResult;
use crate::frame::{AnnotationStyle, FrameClassifier};

pub const DEFAULT_LANDMARK_MODEL: &str = "lbfmodel.yaml";
pub const DEFAULT_CASCADE: &str = "haarcascades/haarcascade_frontalface_alt.xml";

/// Detector options shared by the binaries.
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
    /// LBF facemark model producing 68 landmarks.
    #[clap(long, default_value = DEFAULT_LANDMARK_MODEL)]
    pub landmark_model: PathBuf,

    /// Haar cascade for face detection. Looked up in the OpenCV data
    /// directories when not found on disk.
    #[clap(long, default_value = DEFAULT_CASCADE)]
    pub cascade: PathBuf,

    /// Average eye aspect ratio above which eyes count as open.
    #[clap(long, default_value_t = DEFAULT_EAR_THRESHOLD)]
    pub ear_threshold: f64,

    /// Draw a marker on every landmark.
    #[clap(long)]
    pub draw_landmarks: bool,

    /// Do not draw the eye state label above faces.
    #[clap(long)]
    pub no_label: bool,
}

impl DetectorArgs {
    pub fn frame_classifier(&self) -> EyeResult<FrameClassifier> {
        let classifier =
            EyeStateClassifier::new(ClassifierConfig::with_threshold(self.ear_threshold))?;
        let style = AnnotationStyle {
            draw_landmarks: self.draw_landmarks,
            draw_label: !self.no_label,
        };
        Ok(FrameClassifier::new(classifier, style))
    }

    #[cfg(feature = "opencv")]
    pub fn landmark_provider(&self) -> anyhow::Result<crate::vision::OpenCvLandmarkProvider> {
        crate::vision::OpenCvLandmarkProvider::new(&self.cascade, &self.landmark_model)
    }
}
