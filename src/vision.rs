//! OpenCV backed collaborators: capture, face detection, landmark fitting and
//! drawing.

use anyhow::{bail, Context};
use opencv::core::{Point, Point2f, Rect, Scalar, Vector};
use opencv::prelude::*;
use opencv::{core, face, imgcodecs, imgproc, objdetect, videoio};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::frame::{FaceAnnotation, FrameCanvas};
use crate::geometry::{FaceRegion, Point2D};
use crate::provider::LandmarkProvider;

/// Either a camera index or a path to a video file.
pub enum VideoSource {
    Camera(i32),
    File(PathBuf),
}

pub struct FrameReader {
    capture: videoio::VideoCapture,
}

impl FrameReader {
    pub fn open(source: &VideoSource) -> anyhow::Result<Self> {
        let capture = match source {
            VideoSource::Camera(index) => videoio::VideoCapture::new(*index, videoio::CAP_ANY)?,
            VideoSource::File(path) => {
                ensure_file_exists(path, "video file")?;
                let path = path_str(path)?;
                videoio::VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };
        if !capture.is_opened()? {
            match source {
                VideoSource::Camera(index) => bail!("Unable to open camera {index}"),
                VideoSource::File(path) => bail!("Unable to open video {}", path.display()),
            }
        }
        Ok(Self { capture })
    }

    /// Returns `None` once the stream has no more frames.
    pub fn next_frame(&mut self) -> anyhow::Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }

    pub fn release(mut self) -> anyhow::Result<()> {
        self.capture.release()?;
        Ok(())
    }
}

pub struct FaceDetector {
    classifier: objdetect::CascadeClassifier,
}

impl FaceDetector {
    /// Loads a Haar cascade. Relative paths that do not exist are looked up
    /// in the OpenCV data directories.
    pub fn new(cascade: &Path) -> anyhow::Result<Self> {
        let xml = if cascade.exists() {
            path_str(cascade)?.to_owned()
        } else {
            core::find_file_def(path_str(cascade)?)
                .with_context(|| format!("Cascade {} not found", cascade.display()))?
        };
        let classifier = objdetect::CascadeClassifier::new(&xml)?;
        if classifier.empty()? {
            bail!("Failed to load cascade {xml}");
        }
        debug!("Loaded face cascade from {xml}");
        Ok(Self { classifier })
    }

    pub fn detect(&mut self, image: &Mat) -> anyhow::Result<Vector<Rect>> {
        let mut faces = Vector::<Rect>::new();

        self.classifier.detect_multi_scale(
            image,
            &mut faces,
            1.1,
            2,
            objdetect::CASCADE_SCALE_IMAGE,
            core::Size {
                width: 30,
                height: 30,
            },
            core::Size {
                width: 0,
                height: 0,
            },
        )?;
        Ok(faces)
    }
}

/// Haar cascade for faces, LBF facemark model for the 68 landmarks.
pub struct OpenCvLandmarkProvider {
    detector: FaceDetector,
    facemark: core::Ptr<face::Facemark>,
}

impl OpenCvLandmarkProvider {
    pub fn new(cascade: &Path, landmark_model: &Path) -> anyhow::Result<Self> {
        ensure_file_exists(landmark_model, "landmark model")?;
        let detector = FaceDetector::new(cascade)?;

        let mut facemark = face::create_facemark_lbf()?;
        facemark
            .load_model(path_str(landmark_model)?)
            .with_context(|| format!("Failed to load {}", landmark_model.display()))?;
        info!("Loaded landmark model {}", landmark_model.display());

        Ok(Self { detector, facemark })
    }
}

impl LandmarkProvider for OpenCvLandmarkProvider {
    type Image = Mat;

    fn detect_faces(&mut self, image: &Mat) -> anyhow::Result<Vec<FaceRegion>> {
        let faces = self.detector.detect(image)?;
        Ok(faces
            .iter()
            .map(|face| FaceRegion::from_xywh(face.x, face.y, face.width, face.height))
            .collect())
    }

    fn extract_landmarks(
        &mut self,
        image: &Mat,
        region: &FaceRegion,
    ) -> anyhow::Result<Vec<Point2D>> {
        let faces = Vector::<Rect>::from_iter([Rect::new(
            region.left,
            region.top,
            region.width(),
            region.height(),
        )]);
        let mut landmarks = Vector::<Vector<Point2f>>::new();
        if !self.facemark.fit(image, &faces, &mut landmarks)? || landmarks.is_empty() {
            bail!("Landmark fitting failed for face {region:?}");
        }
        Ok(landmarks
            .get(0)?
            .iter()
            .map(|point| Point2D::new(f64::from(point.x), f64::from(point.y)))
            .collect())
    }
}

impl FrameCanvas for Mat {
    fn draw_face(&mut self, annotation: &FaceAnnotation<'_>) -> anyhow::Result<()> {
        let (b, g, r) = annotation.reading.state.color();
        let color = Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0);
        let region = annotation.region;

        imgproc::rectangle(
            self,
            Rect::new(region.left, region.top, region.width(), region.height()),
            color,
            2,
            imgproc::LINE_8,
            0,
        )?;

        if let Some(landmarks) = annotation.landmarks {
            for landmark in landmarks {
                let center = Point::new(landmark.x.round() as i32, landmark.y.round() as i32);
                imgproc::circle(self, center, 2, color, imgproc::FILLED, imgproc::LINE_8, 0)?;
            }
        }

        if let Some(label) = &annotation.label {
            let origin = Point::new(region.left, (region.top - 10).max(15));
            imgproc::put_text(
                self,
                label,
                origin,
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.6,
                color,
                2,
                imgproc::LINE_8,
                false,
            )?;
        }
        Ok(())
    }
}

pub fn convert_to_grayscale(image: &Mat) -> anyhow::Result<Mat> {
    let mut gray: Mat = Mat::default();
    imgproc::cvt_color_def(image, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    Ok(gray)
}

pub fn jpeg_to_mat(data: &[u8]) -> anyhow::Result<Mat> {
    let buffer = Vector::<u8>::from_slice(data);
    let frame = imgcodecs::imdecode(&buffer, imgcodecs::IMREAD_COLOR)?;
    if frame.empty() {
        bail!("Failed to decode {} byte image", data.len());
    }
    Ok(frame)
}

pub fn encode_jpeg(frame: &Mat) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vector::<u8>::new();
    imgcodecs::imencode_def(".jpg", frame, &mut buffer)?;
    Ok(buffer.to_vec())
}

/// Fails with the missing path named, before any model or device is opened.
pub fn ensure_file_exists(path: &Path, what: &str) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("{what} not found at {}", path.display());
    }
    Ok(())
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("Path {} is not valid UTF-8", path.display()))
}
