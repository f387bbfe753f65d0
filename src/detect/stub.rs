use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::{Detection, ObjectDetector};
use crate::frame::Frame;

const STUB_LABELS: [&str; 3] = ["Hatch", "Ball", "Tape"];

/// Stub detector for tests and `stub://` runs.
///
/// Derives a deterministic set of detections from a hash of the frame
/// contents: the same frame always yields the same detections, and the
/// synthetic camera's scene changes shift them around.
pub struct StubDetector {
    model_id: String,
}

impl StubDetector {
    pub fn new() -> Self {
        Self {
            model_id: "stub/synthetic-ssd".to_string(),
        }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectDetector for StubDetector {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn detect(&mut self, frame: &Frame, confidence: f64) -> Result<Vec<Detection>> {
        let digest: [u8; 32] = Sha256::digest(&frame.pixels).into();
        let mut detections = Vec::new();

        for (lane, label) in STUB_LABELS.iter().enumerate() {
            // Up to three candidates per label, scores drawn from distinct
            // digest bytes so they vary per frame.
            let count = (digest[lane] % 4) as usize;
            for i in 0..count {
                let byte = digest[4 + lane * 8 + i];
                let score = 0.5 + f64::from(byte) / 512.0;
                if score < confidence {
                    continue;
                }
                let box_w = 40.0 + f64::from(byte % 32);
                let box_h = 30.0 + f64::from(byte % 24);
                let center_x = f64::from(frame.width) * (0.2 + 0.25 * i as f64);
                let end_y = f64::from(frame.height) * 0.5 + box_h / 2.0;
                detections.push(Detection {
                    label: label.to_string(),
                    center_x,
                    end_x: center_x + box_w / 2.0,
                    end_y,
                    area: box_w * box_h,
                    confidence: score,
                });
            }
        }

        Ok(detections)
    }
}
