use anyhow::Result;

use crate::detect::Detection;
use crate::frame::Frame;

/// Object-detection backend.
///
/// Implementations wrap an external inference engine. `detect` returns
/// detections in the engine's arrival order, already filtered to the given
/// confidence threshold; the bridge never reorders or re-filters them.
pub trait ObjectDetector {
    /// Identifier of the loaded model, shown on the stream overlay.
    fn model_id(&self) -> &str;

    /// Run detection on a frame at the given confidence threshold (0..1).
    fn detect(&mut self, frame: &Frame, confidence: f64) -> Result<Vec<Detection>>;
}
