use clap::Parser;
use eye_detector::logging::init_tracing;
use eye_detector::vision::{convert_to_grayscale, FrameReader, VideoSource};
use eye_detector::{DetectorArgs, EyeError, LandmarkProvider};
use opencv::highgui;
use std::path::PathBuf;
use tracing::{info, warn};

const WINDOW: &str = "Eye Detector";

#[derive(Parser, Debug)]
#[command(about = "Detects open or closed eyes on a webcam or video")]
struct Args {
    /// Camera index to read from.
    #[clap(short, long, default_value_t = 0, conflicts_with = "video")]
    camera: i32,

    /// Video file to read instead of a camera.
    #[clap(short, long)]
    video: Option<PathBuf>,

    #[command(flatten)]
    detector: DetectorArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args: Args = Args::parse();

    // model files are checked before the camera is touched
    let frame_classifier = args.detector.frame_classifier()?;
    let mut provider = args.detector.landmark_provider()?;

    let source = match args.video {
        Some(path) => VideoSource::File(path),
        None => VideoSource::Camera(args.camera),
    };
    let mut reader = FrameReader::open(&source)?;

    highgui::named_window_def(WINDOW)?;
    info!("Detecting open or closed eyes, press q to quit");

    let result = (|| -> anyhow::Result<()> {
        let mut eyes_open: Option<bool> = None;
        while let Some(mut frame) = reader.next_frame()? {
            let gray = convert_to_grayscale(&frame)?;
            let faces = provider.detect(&gray)?;

            let report = match frame_classifier.classify_frame(&mut frame, &faces) {
                Ok(report) => report,
                Err(err @ EyeError::MalformedLandmarks { .. }) => {
                    warn!("Dropping frame: {err}");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if eyes_open != Some(report.any_eyes_open) {
                if report.any_eyes_open {
                    info!(faces = report.faces.len(), "Eyes open");
                } else {
                    warn!(faces = report.faces.len(), "Eyes closed");
                }
                eyes_open = Some(report.any_eyes_open);
            }

            highgui::imshow(WINDOW, &frame)?;
            if (highgui::wait_key(1)? & 0xFF) == i32::from(b'q') {
                break;
            }
        }
        Ok(())
    })();

    reader.release()?;
    highgui::destroy_all_windows()?;
    result
}
