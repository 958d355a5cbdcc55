use thiserror::Error;

use crate::landmarks::EyeSide;

/// The horizontal corners of an eye coincide.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("eye corners coincide (distance {corner_distance}), eye aspect ratio is undefined")]
pub struct DegenerateEye {
    pub corner_distance: f64,
}

pub type EyeResult<T> = Result<T, EyeError>;

#[derive(Error, Debug)]
pub enum EyeError {
    #[error("degenerate {side} eye geometry")]
    DegenerateGeometry {
        side: EyeSide,
        #[source]
        source: DegenerateEye,
    },
    #[error("malformed landmarks: expected {expected} points, got {actual}")]
    MalformedLandmarks { expected: usize, actual: usize },
    #[error("eye aspect ratio threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),
    #[error(transparent)]
    Render(#[from] anyhow::Error),
}

#[cfg(feature = "zenoh")]
#[derive(Error, Debug)]
pub enum ErrorWrapper {
    #[error("Zenoh error {0:?}")]
    ZenohError(#[from] zenoh::Error),
}
