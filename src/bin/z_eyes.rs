use clap::Parser;
use eye_detector::logging::init_tracing;
use eye_detector::vision::{convert_to_grayscale, encode_jpeg, jpeg_to_mat};
use eye_detector::{DetectorArgs, ErrorWrapper, EyeError, EyeStateMessage, LandmarkProvider};
use tracing::{info, warn};
use zenoh::prelude::r#async::*;

#[derive(Parser, Debug)]
#[command(about = "Classifies eye state of JPEG frames received over zenoh")]
struct Args {
    /// Endpoints to connect to.
    #[clap(short = 'e', long)]
    connect: Vec<zenoh_config::EndPoint>,

    /// Endpoints to listen on.
    #[clap(long)]
    listen: Vec<zenoh_config::EndPoint>,

    /// Key expression JPEG frames arrive on.
    #[clap(long, default_value = "face-tracker/image")]
    image_topic: String,

    /// Key expression eye state is published on.
    #[clap(long, default_value = "eye-detector/state")]
    state_topic: String,

    /// Also publish the annotated frames as JPEG on this key expression.
    #[clap(long)]
    annotated_topic: Option<String>,

    #[command(flatten)]
    detector: DetectorArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args: Args = Args::parse();

    let frame_classifier = args.detector.frame_classifier()?;
    let mut provider = args.detector.landmark_provider()?;

    // configure zenoh
    let mut zenoh_config = Config::default();
    if !args.listen.is_empty() {
        zenoh_config.listen.endpoints = args.listen.clone();
        info!(
            "Configured listening endpoints {:?}",
            zenoh_config.listen.endpoints
        );
    }
    if !args.connect.is_empty() {
        zenoh_config.connect.endpoints = args.connect.clone();
        info!(
            "Configured connect endpoints {:?}",
            zenoh_config.connect.endpoints
        );
    }

    let zenoh_session = zenoh::open(zenoh_config)
        .res()
        .await
        .map_err(ErrorWrapper::ZenohError)?;
    let zenoh_session = zenoh_session.into_arc();

    let subscriber = zenoh_session
        .declare_subscriber(args.image_topic.as_str())
        .best_effort()
        .res()
        .await
        .map_err(ErrorWrapper::ZenohError)?;

    let publisher = zenoh_session
        .declare_publisher(args.state_topic.as_str())
        .congestion_control(CongestionControl::Drop)
        .priority(Priority::InteractiveHigh)
        .res()
        .await
        .map_err(ErrorWrapper::ZenohError)?;

    let annotated_publisher = match &args.annotated_topic {
        Some(topic) => Some(
            zenoh_session
                .declare_publisher(topic.as_str())
                .congestion_control(CongestionControl::Drop)
                .res()
                .await
                .map_err(ErrorWrapper::ZenohError)?,
        ),
        None => None,
    };

    info!(
        "Reading frames from {} and publishing to {}",
        args.image_topic, args.state_topic
    );

    let mut frame_counter: u64 = 0;
    loop {
        let msg = subscriber.recv_async().await?;
        let payload: Vec<u8> = msg.value.try_into()?;

        let mut frame = match jpeg_to_mat(&payload) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("Skipping undecodable frame: {err:#}");
                continue;
            }
        };
        frame_counter += 1;

        let gray = convert_to_grayscale(&frame)?;
        let faces = provider.detect(&gray)?;
        let report = match frame_classifier.classify_frame(&mut frame, &faces) {
            Ok(report) => report,
            Err(err @ EyeError::MalformedLandmarks { .. }) => {
                warn!("Dropping frame {frame_counter}: {err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let message = EyeStateMessage::from_report(frame_counter, &report);
        publisher
            .put(message.to_json()?)
            .res()
            .await
            .map_err(ErrorWrapper::ZenohError)?;

        if let Some(annotated_publisher) = &annotated_publisher {
            annotated_publisher
                .put(encode_jpeg(&frame)?)
                .res()
                .await
                .map_err(ErrorWrapper::ZenohError)?;
        }
    }
}
