use serde::Serialize;

use crate::classifier::FaceReading;
use crate::frame::FrameReport;
use crate::geometry::FaceRegion;

/// Published once per processed frame.
#[derive(Debug, Clone, Serialize)]
pub struct EyeStateMessage {
    pub frame: u64,
    pub any_eyes_open: bool,
    pub faces: Vec<FaceMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaceMessage {
    pub region: FaceRegion,
    #[serde(flatten)]
    pub reading: Option<FaceReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EyeStateMessage {
    pub fn from_report(frame: u64, report: &FrameReport) -> Self {
        let faces = report
            .faces
            .iter()
            .map(|outcome| match &outcome.reading {
                Ok(reading) => FaceMessage {
                    region: outcome.region,
                    reading: Some(*reading),
                    error: None,
                },
                Err(err) => FaceMessage {
                    region: outcome.region,
                    reading: None,
                    error: Some(format!("{err:#}")),
                },
            })
            .collect();
        Self {
            frame,
            any_eyes_open: report.any_eyes_open,
            faces,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
