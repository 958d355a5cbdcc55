pub mod classifier;
pub mod config;
pub mod ear;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod landmarks;
pub mod logging;
pub mod message;
pub mod provider;
#[cfg(feature = "opencv")]
pub mod vision;

pub use classifier::{
    ClassifierConfig, EyeState, EyeStateClassifier, FaceReading, DEFAULT_EAR_THRESHOLD,
};
pub use config::DetectorArgs;
pub use ear::eye_aspect_ratio;
#[cfg(feature = "zenoh")]
pub use error::ErrorWrapper;
pub use error::{DegenerateEye, EyeError, EyeResult};
pub use frame::{
    AnnotationStyle, FaceAnnotation, FaceOutcome, FrameCanvas, FrameClassifier, FrameReport,
};
pub use geometry::{FaceRegion, Point2D};
pub use landmarks::{EyeLandmarks, EyeSide, FaceLandmarks, LandmarkScheme};
pub use message::{EyeStateMessage, FaceMessage};
pub use provider::{FaceDetection, LandmarkProvider};
#[cfg(feature = "opencv")]
pub use vision::{
    convert_to_grayscale, jpeg_to_mat, FrameReader, OpenCvLandmarkProvider, VideoSource,
};
